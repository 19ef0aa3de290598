pub mod cli;
pub mod toml_config;

use crate::adapters::GeminiSettings;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use std::path::{Path, PathBuf};
use std::time::Duration;
use toml_config::TomlConfig;

pub const DEFAULT_BILLS_API_BASE: &str = "https://bills-api.parliament.uk/api/v1";
pub const DEFAULT_SITE_BASE: &str = "https://bills.parliament.uk/bills";
pub const DEFAULT_MODEL_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_OUTPUT_PATH: &str = "data/bills.json";
pub const DEFAULT_LIMIT: usize = 20;
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_DELAY_MS: u64 = 2000;

pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const CONFIG_PATH_VAR: &str = "BILL_IMPACT_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "bill-impact.toml";

#[cfg(feature = "cli")]
#[derive(Debug, Clone, clap::Parser)]
#[command(name = "bill-impact", version)]
#[command(about = "Fetch recent UK Parliament bills and record a six-dimension impact analysis")]
pub struct CliConfig {
    /// How many recently updated bills to consider
    #[arg(long, default_value_t = DEFAULT_LIMIT)]
    pub limit: usize,
}

/// Everything one run needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bills_api_base: String,
    pub site_base: String,
    pub output_path: String,
    pub limit: usize,
    pub model_api_base: String,
    pub model: String,
    pub temperature: f32,
    pub analysis_delay: Duration,
    pub api_key: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bills_api_base: DEFAULT_BILLS_API_BASE.to_string(),
            site_base: DEFAULT_SITE_BASE.to_string(),
            output_path: DEFAULT_OUTPUT_PATH.to_string(),
            limit: DEFAULT_LIMIT,
            model_api_base: DEFAULT_MODEL_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            analysis_delay: Duration::from_millis(DEFAULT_DELAY_MS),
            api_key: None,
        }
    }
}

impl AppConfig {
    /// Defaults overlaid with the settings file (if any) and the API key from the environment.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Some(path) = settings_file_path() {
            tracing::debug!("Loading settings from {}", path.display());
            config.apply_toml(TomlConfig::from_file(&path)?);
        }
        config.api_key = std::env::var(API_KEY_VAR).ok();
        Ok(config)
    }

    pub fn apply_toml(&mut self, file: TomlConfig) {
        if let Some(v) = file.source.api_base {
            self.bills_api_base = v;
        }
        if let Some(v) = file.source.site_base {
            self.site_base = v;
        }
        if let Some(v) = file.analysis.api_base {
            self.model_api_base = v;
        }
        if let Some(v) = file.analysis.model {
            self.model = v;
        }
        if let Some(v) = file.analysis.temperature {
            self.temperature = v;
        }
        if let Some(v) = file.analysis.delay_ms {
            self.analysis_delay = Duration::from_millis(v);
        }
        if let Some(v) = file.output.path {
            self.output_path = v;
        }
    }

    #[cfg(feature = "cli")]
    pub fn apply_cli(&mut self, cli: &CliConfig) {
        self.limit = cli.limit;
    }

    /// Model settings; fails when the API key is absent or blank.
    pub fn gemini_settings(&self) -> Result<GeminiSettings> {
        let api_key = validation::validate_required_field(API_KEY_VAR, &self.api_key)?;
        validation::validate_non_empty_string(API_KEY_VAR, api_key)?;
        Ok(GeminiSettings {
            api_base: self.model_api_base.clone(),
            api_key: api_key.clone(),
            model: self.model.clone(),
            temperature: self.temperature,
        })
    }

    /// Splits the output path into the storage root and the file name inside it.
    pub fn storage_location(&self) -> (String, String) {
        let path = Path::new(&self.output_path);
        let file = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.output_path.clone());
        let root = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|| ".".to_string());
        (root, file)
    }
}

fn settings_file_path() -> Option<PathBuf> {
    match std::env::var(CONFIG_PATH_VAR) {
        Ok(path) => Some(PathBuf::from(path)),
        Err(_) => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            default.exists().then_some(default)
        }
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("source.api_base", &self.bills_api_base)?;
        validation::validate_url("source.site_base", &self.site_base)?;
        validation::validate_url("analysis.api_base", &self.model_api_base)?;
        validation::validate_non_empty_string("analysis.model", &self.model)?;
        validation::validate_range("analysis.temperature", self.temperature, 0.0, 2.0)?;
        validation::validate_path("output.path", &self.output_path)?;
        validation::validate_positive_number("limit", self.limit, 1)?;
        Ok(())
    }
}

impl ConfigProvider for AppConfig {
    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn limit(&self) -> usize {
        self.limit
    }

    fn site_base(&self) -> &str {
        &self.site_base
    }

    fn analysis_delay(&self) -> Duration {
        self.analysis_delay
    }
}
