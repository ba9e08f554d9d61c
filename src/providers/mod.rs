mod anthropic;
mod factory;
mod open_ai;
mod prompt;
mod replicate;

pub use anthropic::AnthropicProvider;
pub use factory::ProviderFactory;
pub use open_ai::OpenAIProvider;
pub use prompt::{build_prompt, RECIPE_EXTRACTION_PROMPT};
pub use replicate::ReplicateProvider;

use crate::config::GenerationConfig;
use crate::error::GenerationError;
use async_trait::async_trait;
use reqwest::Response;

/// Sampling parameters, fixed per deployment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self::from(&GenerationConfig::default())
    }
}

impl From<&GenerationConfig> for GenerationOptions {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            top_p: config.top_p,
        }
    }
}

/// Unified trait for all text-generation backends
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Get the provider name (e.g., "replicate", "openai")
    fn provider_name(&self) -> &str;

    /// Send a fully rendered prompt and return the raw text the model produced
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Turn a non-success HTTP status into [`GenerationError::Status`]
async fn check_status(response: Response) -> Result<Response, GenerationError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(GenerationError::Status {
        status: status.as_u16(),
        body,
    })
}
