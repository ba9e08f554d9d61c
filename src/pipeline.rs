use crate::builder::RecipeExtractorBuilder;
use crate::config::ExtractionConfig;
use crate::error::ExtractionError;
use crate::model::RecipesResponse;
use crate::parser::parse_recipes;
use crate::providers::{build_prompt, TextGenerator};
use crate::transcript::TranscriptSource;
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::sleep;

/// How many times a failed generation is re-issued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first one
    pub retry_attempts: u32,
    /// Fixed pause before each retry
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&ExtractionConfig::default())
    }
}

impl From<&ExtractionConfig> for RetryPolicy {
    fn from(config: &ExtractionConfig) -> Self {
        Self {
            retry_attempts: config.retry_attempts,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        }
    }
}

impl RetryPolicy {
    pub fn max_attempts(&self) -> u32 {
        self.retry_attempts.saturating_add(1)
    }
}

/// Turns a video into the recipes mentioned in it.
///
/// The transcript is fetched once. Generation and parsing are retried together:
/// a backend failure and an unparseable answer both consume one retry, and when
/// the budget is spent the last failure is returned.
pub struct RecipeExtractor {
    source: Arc<dyn TranscriptSource>,
    generator: Arc<dyn TextGenerator>,
    retry: RetryPolicy,
}

impl RecipeExtractor {
    pub fn new(
        source: Arc<dyn TranscriptSource>,
        generator: Arc<dyn TextGenerator>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            source,
            generator,
            retry,
        }
    }

    /// Creates a new builder for wiring an extractor from configuration
    pub fn builder() -> RecipeExtractorBuilder {
        RecipeExtractorBuilder::default()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Fetch the transcript of `video_id` and extract its recipes
    pub async fn extract(&self, video_id: &str) -> Result<RecipesResponse, ExtractionError> {
        let start = Instant::now();

        let transcript = match self.source.fetch_transcript(video_id).await {
            Ok(transcript) if !transcript.trim().is_empty() => transcript,
            Ok(_) => {
                warn!("Transcript for {} is empty", video_id);
                return Err(ExtractionError::TranscriptUnavailable {
                    video_id: video_id.to_string(),
                });
            }
            Err(e) => {
                warn!("Transcript for {} unavailable: {}", video_id, e);
                return Err(ExtractionError::TranscriptUnavailable {
                    video_id: video_id.to_string(),
                });
            }
        };

        info!(
            "Transcript for {} ready after {:.2} seconds ({} characters)",
            video_id,
            start.elapsed().as_secs_f64(),
            transcript.len()
        );

        let result = self.extract_from_transcript(&transcript).await;
        info!(
            "Extraction for {} finished in {:.2} seconds",
            video_id,
            start.elapsed().as_secs_f64()
        );
        result
    }

    /// Extract recipes from transcript text that is already at hand.
    ///
    /// The transcript must not be empty.
    pub async fn extract_from_transcript(
        &self,
        transcript: &str,
    ) -> Result<RecipesResponse, ExtractionError> {
        let prompt = build_prompt(transcript);
        let max_attempts = self.retry.max_attempts();
        let mut attempt = 1;

        loop {
            let start = Instant::now();
            debug!(
                "Generating with {} (attempt {}/{})",
                self.generator.provider_name(),
                attempt,
                max_attempts
            );

            let failure = match self.generator.generate(&prompt).await {
                Ok(raw) => {
                    info!(
                        "Generation attempt {} completed in {:.2} seconds",
                        attempt,
                        start.elapsed().as_secs_f64()
                    );
                    match parse_recipes(&raw) {
                        Ok(response) => {
                            info!(
                                "Parsed {} recipe(s) on attempt {}",
                                response.recipes.len(),
                                attempt
                            );
                            return Ok(response);
                        }
                        Err(e) => {
                            debug!("Unparseable output: {}", e.raw());
                            ExtractionError::Parse {
                                attempts: attempt,
                                source: e,
                            }
                        }
                    }
                }
                Err(e) => ExtractionError::Generation {
                    attempts: attempt,
                    source: e,
                },
            };

            if attempt >= max_attempts {
                error!("Giving up after {} attempt(s): {}", attempt, failure);
                return Err(failure);
            }

            warn!(
                "Attempt {}/{} failed after {:.2} seconds: {}. Retrying...",
                attempt,
                max_attempts,
                start.elapsed().as_secs_f64(),
                failure
            );
            if !self.retry.retry_delay.is_zero() {
                sleep(self.retry.retry_delay).await;
            }
            attempt += 1;
        }
    }
}
