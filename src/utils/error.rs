use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImpactError {
    #[error("HTTP request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Upstream returned HTTP {status} for {url}")]
    UpstreamStatusError { status: u16, url: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Model request failed: {0}")]
    ModelClientError(#[from] gemini_rust::ClientError),

    #[error("Model response error: {message}")]
    ModelResponseError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

impl ImpactError {
    pub fn model(message: impl Into<String>) -> Self {
        Self::ModelResponseError {
            message: message.into(),
        }
    }

    /// Short message for stderr, without the nested source chain.
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ApiError(e) if e.is_timeout() => "Request timed out".to_string(),
            Self::ApiError(e) if e.is_connect() => {
                "Could not connect to upstream service".to_string()
            }
            Self::ApiError(_) => "Network request failed".to_string(),
            Self::UpstreamStatusError { status, .. } => {
                format!("Upstream service answered with HTTP {}", status)
            }
            Self::IoError(e) => format!("File system error: {}", e.kind()),
            Self::ModelClientError(_) => "Model request failed".to_string(),
            Self::SerializationError(_) => "Could not encode or decode JSON data".to_string(),
            Self::TomlError(_) => "Settings file is not valid TOML".to_string(),
            Self::ModelResponseError { message } => {
                format!("Model response unusable: {}", message)
            }
            Self::ConfigError { message } => message.clone(),
            Self::MissingConfigError { field } => format!("{} is required", field),
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid {}: {}", field, reason)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::ApiError(_) | Self::UpstreamStatusError { .. } => {
                "Check network access to the bills API and try again later".to_string()
            }
            Self::IoError(_) => {
                "Check that the output directory exists and is writable".to_string()
            }
            Self::ModelClientError(_)
            | Self::SerializationError(_)
            | Self::ModelResponseError { .. } => {
                "Re-run the pipeline; the failing bill is recorded and skipped".to_string()
            }
            Self::TomlError(_) | Self::ConfigError { .. } => {
                "Fix the settings file or unset BILL_IMPACT_CONFIG".to_string()
            }
            Self::MissingConfigError { field } if field == "GEMINI_API_KEY" => {
                "Export GEMINI_API_KEY with a valid Gemini API key".to_string()
            }
            Self::MissingConfigError { field } => format!("Provide a value for {}", field),
            Self::InvalidConfigValueError { field, .. } => {
                format!("Correct the value of {}", field)
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ImpactError>;
