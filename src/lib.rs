pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{BillsApiClient, GeminiAnalyser, GeminiSettings};
pub use config::{cli::LocalStorage, AppConfig};
pub use core::{
    etl::{EtlEngine, RunReport},
    pipeline::BillPipeline,
    store::AnalysisStore,
};
pub use domain::model::{AnalysisCategory, Bill, BillAnalysis, Impact, DIMENSIONS};
pub use utils::error::{ImpactError, Result};
