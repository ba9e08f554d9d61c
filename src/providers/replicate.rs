use super::{check_status, GenerationOptions, TextGenerator};
use crate::config::GenerationConfig;
use crate::error::GenerationError;
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::{sleep, Instant};

const DEFAULT_BASE_URL: &str = "https://api.replicate.com";

/// A prediction as returned by the Replicate API
#[derive(Debug, Deserialize)]
struct Prediction {
    status: String,
    #[serde(default)]
    output: Value,
    #[serde(default)]
    error: Value,
    urls: Option<PredictionUrls>,
}

#[derive(Debug, Deserialize)]
struct PredictionUrls {
    get: String,
}

impl Prediction {
    fn is_terminal(&self) -> bool {
        matches!(self.status.as_str(), "succeeded" | "failed" | "canceled")
    }

    /// Language models stream tokens, so output is usually a list of fragments
    fn output_text(&self) -> Option<String> {
        match &self.output {
            Value::String(text) => Some(text.clone()),
            Value::Array(parts) => Some(parts.iter().filter_map(Value::as_str).collect()),
            _ => None,
        }
    }
}

/// Hosted model predictions on Replicate (the default backend)
pub struct ReplicateProvider {
    client: Client,
    api_token: String,
    base_url: String,
    model: String,
    options: GenerationOptions,
    timeout: Duration,
    poll_interval: Duration,
}

impl ReplicateProvider {
    /// Create a new Replicate provider from configuration and a resolved API token
    pub fn new(config: &GenerationConfig, api_token: String) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(ReplicateProvider {
            client,
            api_token,
            base_url,
            model: config.model.clone(),
            options: GenerationOptions::from(config),
            timeout: config.timeout(),
            poll_interval: config.poll_interval(),
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(api_token: String, base_url: String, model: String) -> Self {
        ReplicateProvider {
            client: Client::new(),
            api_token,
            base_url,
            model,
            options: GenerationOptions::default(),
            timeout: Duration::from_secs(5),
            poll_interval: Duration::from_millis(10),
        }
    }

    async fn create_prediction(&self, prompt: &str) -> Result<Prediction, GenerationError> {
        let response = self
            .client
            .post(format!("{}/v1/models/{}/predictions", self.base_url, self.model))
            .bearer_auth(&self.api_token)
            .header("Prefer", "wait")
            .json(&json!({
                "input": {
                    "prompt": prompt,
                    "temperature": self.options.temperature,
                    "max_tokens": self.options.max_tokens,
                    "top_p": self.options.top_p
                }
            }))
            .send()
            .await?;

        Ok(check_status(response).await?.json().await?)
    }

    async fn fetch_prediction(&self, url: &str) -> Result<Prediction, GenerationError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_token)
            .send()
            .await?;

        Ok(check_status(response).await?.json().await?)
    }
}

#[async_trait]
impl TextGenerator for ReplicateProvider {
    fn provider_name(&self) -> &str {
        "replicate"
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let deadline = Instant::now() + self.timeout;
        let mut prediction = self.create_prediction(prompt).await?;

        while !prediction.is_terminal() {
            let url = prediction
                .urls
                .as_ref()
                .map(|urls| urls.get.clone())
                .ok_or_else(|| {
                    GenerationError::MissingOutput("Prediction has no status URL".to_string())
                })?;

            if Instant::now() + self.poll_interval > deadline {
                warn!("Replicate prediction still '{}' at deadline", prediction.status);
                return Err(GenerationError::Timeout(self.timeout));
            }

            debug!("Replicate prediction is '{}', polling", prediction.status);
            sleep(self.poll_interval).await;
            prediction = self.fetch_prediction(&url).await?;
        }

        match prediction.status.as_str() {
            "succeeded" => prediction.output_text().ok_or_else(|| {
                GenerationError::MissingOutput(format!(
                    "Unexpected prediction output: {}",
                    prediction.output
                ))
            }),
            status => {
                let message = prediction
                    .error
                    .as_str()
                    .map(String::from)
                    .unwrap_or_else(|| format!("prediction {status}"));
                Err(GenerationError::Backend(message))
            }
        }
    }
}
