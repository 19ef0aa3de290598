use crate::core::analysis::{build_prompt, parse_response};
use crate::domain::model::AnalysisResult;
use crate::domain::ports::Analyser;
use crate::utils::error::{ImpactError, Result};
use async_trait::async_trait;
use gemini_rust::Gemini;
use url::Url;

/// Connection and sampling settings for the Gemini API.
#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
}

impl GeminiSettings {
    /// Versioned API root the client resolves model paths against.
    fn base_url(&self) -> Result<Url> {
        let raw = format!("{}/v1beta/", self.api_base.trim_end_matches('/'));
        Url::parse(&raw).map_err(|e| ImpactError::InvalidConfigValueError {
            field: "analysis.api_base".to_string(),
            value: self.api_base.clone(),
            reason: format!("Invalid URL format: {}", e),
        })
    }

    fn model_path(&self) -> String {
        if self.model.starts_with("models/") {
            self.model.clone()
        } else {
            format!("models/{}", self.model)
        }
    }
}

pub struct GeminiAnalyser {
    client: Gemini,
    temperature: f32,
}

impl GeminiAnalyser {
    pub fn new(settings: GeminiSettings) -> Result<Self> {
        let client = Gemini::with_model_and_base_url(
            &settings.api_key,
            settings.model_path(),
            settings.base_url()?,
        )?;
        Ok(Self {
            client,
            temperature: settings.temperature,
        })
    }

    /// Sends `prompt` and returns the first candidate's text.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        tracing::debug!(prompt_chars = prompt.len(), "calling model");
        let response = self
            .client
            .generate_content()
            .with_user_message(prompt)
            .with_temperature(self.temperature)
            .with_response_mime_type("application/json")
            .execute()
            .await?;

        let text = response.text();
        if text.trim().is_empty() {
            return Err(ImpactError::model("model returned no text"));
        }
        Ok(text)
    }
}

#[async_trait]
impl Analyser for GeminiAnalyser {
    async fn analyse(&self, title: &str, text: &str) -> Result<AnalysisResult> {
        let prompt = build_prompt(title, text);
        let raw = self.generate(&prompt).await?;
        parse_response(&raw)
    }
}
