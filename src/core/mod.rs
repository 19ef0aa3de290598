pub mod analysis;
pub mod etl;
pub mod pipeline;
pub mod store;

pub use crate::domain::model::{AnalysisResult, BillAnalysis, ParliamentBill};
pub use crate::domain::ports::{Analyser, BillSource, ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
