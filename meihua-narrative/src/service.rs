//! NarrativeService - turns a divination result into a written reading.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use meihua_core::DivinationResult;

use crate::backend::traits::{CompletionRequest, LlmBackend, LlmError};
use crate::backend::{AnthropicBackend, OpenAiBackend};
use crate::prompt::{PromptAssembler, SECTION_ADVICE, SECTION_OVERVIEW};
use crate::types::{ConnectionStatus, Narrative, NarrativeConfig, NarrativeContext, Provider};

/// Error types for the service.
#[derive(Debug, thiserror::Error)]
pub enum NarrativeError {
    /// No backend configured or reachable
    #[error("Narrative service unavailable")]
    ServiceUnavailable,

    /// Backend error
    #[error("Backend error: {0}")]
    Backend(#[from] LlmError),
}

/// Writes narratives with the first available backend.
///
/// Backend failures are returned as-is; retrying is the caller's decision.
pub struct NarrativeService {
    backends: Vec<Arc<dyn LlmBackend>>,
    max_tokens: u32,
    temperature: f32,
}

impl NarrativeService {
    /// Create a new service with the given backends, in priority order.
    pub fn new(backends: Vec<Arc<dyn LlmBackend>>) -> Self {
        let defaults = NarrativeConfig::default();
        Self {
            backends,
            max_tokens: defaults.max_tokens,
            temperature: defaults.temperature,
        }
    }

    /// Build from configuration, reading the API key from the environment.
    ///
    /// A missing key leaves the service without backends, so every call
    /// reports [`NarrativeError::ServiceUnavailable`].
    pub fn from_config(config: &NarrativeConfig) -> Result<Self, LlmError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());

        let backend: Option<Arc<dyn LlmBackend>> = match (config.provider, api_key) {
            (Provider::Anthropic, Some(key)) => {
                let base_url = config
                    .base_url
                    .as_deref()
                    .unwrap_or(crate::backend::anthropic::DEFAULT_BASE_URL);
                Some(Arc::new(AnthropicBackend::new(base_url, &config.model, key)?))
            }
            (Provider::Anthropic, None) => {
                warn!(env = %config.api_key_env, "API key not configured, narratives disabled");
                None
            }
            (Provider::OpenAi, key) => {
                let base_url = config.base_url.as_deref().unwrap_or("https://api.openai.com/v1");
                Some(Arc::new(OpenAiBackend::new(base_url, &config.model, key)?))
            }
        };

        Ok(Self::new(backend.into_iter().collect()).with_sampling(config.max_tokens, config.temperature))
    }

    pub fn with_sampling(mut self, max_tokens: u32, temperature: f32) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }

    /// Generate a reading for a divination result.
    pub async fn generate(
        &self,
        result: &DivinationResult,
        context: NarrativeContext,
    ) -> Result<Narrative, NarrativeError> {
        let backend = self.select_backend().await?;
        let request_id = Uuid::new_v4();

        debug!(
            request_id = %request_id,
            model = backend.id(),
            primary = result.primary.id,
            category = context.question_category.as_str(),
            "Generating narrative"
        );

        let max_tokens = self.max_tokens.min(backend.capabilities().max_output_tokens);
        let request = CompletionRequest::user(PromptAssembler::build_interpretation_prompt(
            result,
            context.question_category,
        ))
        .with_system(PromptAssembler::system_prompt())
        .with_max_tokens(max_tokens)
        .with_temperature(self.temperature)
        .with_top_p(0.9);

        let completion = backend.complete(request).await.map_err(|e| {
            warn!(request_id = %request_id, error = %e, "Narrative generation failed");
            e
        })?;

        let confidence = narrative_confidence(&completion.content);
        info!(
            request_id = %request_id,
            model = backend.id(),
            tokens = completion.usage.total(),
            confidence,
            "Narrative generated"
        );

        Ok(Narrative {
            content: completion.content,
            confidence,
            model: backend.id().to_string(),
            generated_at: Utc::now(),
            usage: completion.usage,
        })
    }

    /// Issue a tiny completion and report whether it worked.
    pub async fn test_connection(&self) -> ConnectionStatus {
        let backend = match self.select_backend().await {
            Ok(backend) => backend,
            Err(e) => {
                return ConnectionStatus {
                    success: false,
                    message: e.to_string(),
                    response: None,
                }
            }
        };

        let request = CompletionRequest::user(PromptAssembler::connection_test_prompt()).with_max_tokens(50);
        match backend.complete(request).await {
            Ok(completion) => ConnectionStatus {
                success: true,
                message: format!("Connected to {}", backend.id()),
                response: Some(completion.content),
            },
            Err(e) => ConnectionStatus {
                success: false,
                message: format!("Connection test failed: {e}"),
                response: None,
            },
        }
    }

    async fn select_backend(&self) -> Result<Arc<dyn LlmBackend>, NarrativeError> {
        for backend in &self.backends {
            if backend.is_available().await {
                return Ok(Arc::clone(backend));
            }
        }
        Err(NarrativeError::ServiceUnavailable)
    }
}

/// Structural quality heuristic for a generated reading, in hundredths.
pub fn narrative_confidence(content: &str) -> f64 {
    let mut hundredths: i32 = 80;
    let length = content.chars().count();
    if length > 500 {
        hundredths += 10;
    }
    if length < 200 {
        hundredths -= 10;
    }
    if content.contains("##") && content.contains(SECTION_OVERVIEW) && content.contains(SECTION_ADVICE) {
        hundredths += 10;
    }
    f64::from(hundredths.clamp(50, 95)) / 100.0
}
