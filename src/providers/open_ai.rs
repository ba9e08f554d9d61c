use super::{check_status, GenerationOptions, TextGenerator};
use crate::config::GenerationConfig;
use crate::error::GenerationError;
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Chat-completions backend; also serves OpenAI-compatible local servers via `base_url`
pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    options: GenerationOptions,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider from configuration and a resolved API key
    pub fn new(config: &GenerationConfig, api_key: String) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(OpenAIProvider {
            client,
            api_key,
            base_url,
            model: config.model.clone(),
            options: GenerationOptions::from(config),
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(api_key: String, base_url: String, model: String) -> Self {
        OpenAIProvider {
            client: Client::new(),
            api_key,
            base_url,
            model,
            options: GenerationOptions::default(),
        }
    }
}

#[async_trait]
impl TextGenerator for OpenAIProvider {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({
                "model": self.model,
                "messages": [
                    {"role": "user", "content": prompt}
                ],
                "temperature": self.options.temperature,
                "max_tokens": self.options.max_tokens,
                "top_p": self.options.top_p
            }))
            .send()
            .await?;

        let response_body: Value = check_status(response).await?.json().await?;
        debug!("{:?}", response_body);

        if let Some(error) = response_body.get("error").filter(|e| !e.is_null()) {
            let message = error["message"]
                .as_str()
                .or_else(|| error.as_str())
                .unwrap_or("Unknown error");
            return Err(GenerationError::Backend(message.to_string()));
        }

        response_body["choices"][0]["message"]["content"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| {
                GenerationError::MissingOutput(
                    "Failed to extract content from OpenAI response".to_string(),
                )
            })
    }
}
