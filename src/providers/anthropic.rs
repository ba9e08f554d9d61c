use super::{check_status, GenerationOptions, TextGenerator};
use crate::config::GenerationConfig;
use crate::error::GenerationError;
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    options: GenerationOptions,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider from configuration and a resolved API key
    pub fn new(config: &GenerationConfig, api_key: String) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(AnthropicProvider {
            client,
            api_key,
            base_url,
            model: config.model.clone(),
            options: GenerationOptions::from(config),
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(api_key: String, base_url: String, model: String) -> Self {
        AnthropicProvider {
            client: Client::new(),
            api_key,
            base_url,
            model,
            options: GenerationOptions::default(),
        }
    }
}

#[async_trait]
impl TextGenerator for AnthropicProvider {
    fn provider_name(&self) -> &str {
        "anthropic"
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&json!({
                "model": self.model,
                "max_tokens": self.options.max_tokens,
                "temperature": self.options.temperature,
                "top_p": self.options.top_p,
                "messages": [
                    {
                        "role": "user",
                        "content": prompt
                    }
                ]
            }))
            .send()
            .await?;

        let response_body: Value = check_status(response).await?.json().await?;
        debug!("{:?}", response_body);

        if response_body["type"] == "error" {
            let message = response_body["error"]["message"]
                .as_str()
                .unwrap_or("Unknown error");
            return Err(GenerationError::Backend(message.to_string()));
        }

        response_body["content"][0]["text"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| {
                GenerationError::MissingOutput(
                    "Failed to extract content from Anthropic response".to_string(),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[tokio::test]
    async fn test_generate() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .match_header("x-api-key", "fake_api_key")
            .match_header("anthropic-version", "2023-06-01")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "type": "message",
                    "content": [{"type": "text", "text": "[{\"name\":\"Omelette\",\"ingredients\":[\"eggs\"]}]"}]
                }"#,
            )
            .create_async()
            .await;

        let provider = AnthropicProvider::with_base_url(
            "fake_api_key".to_string(),
            server.url(),
            "claude-3-5-haiku-latest".to_string(),
        );

        let result = provider.generate("prompt").await.unwrap();
        assert!(result.contains("Omelette"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_generate_overloaded() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/messages")
            .with_status(529)
            .with_header("content-type", "application/json")
            .with_body(r#"{"type": "error", "error": {"type": "overloaded_error", "message": "Overloaded"}}"#)
            .create_async()
            .await;

        let provider = AnthropicProvider::with_base_url(
            "fake_api_key".to_string(),
            server.url(),
            "claude-3-5-haiku-latest".to_string(),
        );

        let result = provider.generate("prompt").await;
        assert!(matches!(result, Err(GenerationError::Status { status: 529, .. })));
    }

    #[test]
    fn test_provider_name() {
        let provider = AnthropicProvider::with_base_url(
            "fake_api_key".to_string(),
            DEFAULT_BASE_URL.to_string(),
            "claude-3-5-haiku-latest".to_string(),
        );
        assert_eq!(provider.provider_name(), "anthropic");
    }
}
