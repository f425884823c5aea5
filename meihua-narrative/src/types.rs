//! Types for narrative generation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use meihua_core::QuestionCategory;

#[cfg(feature = "typescript")]
use ts_rs::TS;

use crate::backend::Usage;

/// Hosted model provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Anthropic,
    OpenAi,
}

/// Configuration for narrative generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrativeConfig {
    /// Whether narratives are requested at all
    pub enabled: bool,
    pub provider: Provider,
    /// Override of the provider's API base URL
    pub base_url: Option<String>,
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: Provider::Anthropic,
            base_url: None,
            model: crate::backend::anthropic::DEFAULT_MODEL.to_string(),
            api_key_env: "CLAUDE_API_KEY".to_string(),
            max_tokens: 1000,
            temperature: 0.7,
        }
    }
}

/// Caller context for a narrative request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeContext {
    pub question_category: QuestionCategory,
}

impl NarrativeContext {
    pub fn new(question_category: QuestionCategory) -> Self {
        Self { question_category }
    }
}

/// A generated reading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Narrative {
    pub content: String,
    /// Structural quality heuristic in 0.5..=0.95
    pub confidence: f64,
    pub model: String,
    pub generated_at: DateTime<Utc>,
    pub usage: Usage,
}

/// Outcome of a connection test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    pub success: bool,
    pub message: String,
    /// Model reply, when the call succeeded
    pub response: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = NarrativeConfig::default();
        assert!(!config.enabled);
        assert_eq!(config.provider, Provider::Anthropic);
        assert_eq!(config.api_key_env, "CLAUDE_API_KEY");
        assert_eq!(config.max_tokens, 1000);
    }

    #[test]
    fn test_partial_config() {
        let config: NarrativeConfig =
            serde_json::from_str(r#"{"provider": "openai", "model": "gpt-4o-mini"}"#).unwrap();
        assert_eq!(config.provider, Provider::OpenAi);
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.temperature, 0.7);
    }
}
