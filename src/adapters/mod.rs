// Adapters layer: concrete clients for the external services behind the domain ports.

pub mod gemini;
pub mod parliament;

pub use gemini::{GeminiAnalyser, GeminiSettings};
pub use parliament::BillsApiClient;
