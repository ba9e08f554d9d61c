use std::sync::Arc;
use std::time::Duration;

use crate::{
    config::AppConfig,
    error::SetupError,
    pipeline::{RecipeExtractor, RetryPolicy},
    providers::{ProviderFactory, TextGenerator},
    secrets::{self, SecretStore},
    transcript::{TranscriptSource, YouTubeTranscriptSource},
};

/// Builder for configuring a [`RecipeExtractor`].
///
/// Collaborators that are not injected are created from the configuration,
/// with credentials resolved through the secret store.
#[derive(Default)]
pub struct RecipeExtractorBuilder {
    config: Option<AppConfig>,
    secrets: Option<Arc<dyn SecretStore>>,
    source: Option<Arc<dyn TranscriptSource>>,
    generator: Option<Arc<dyn TextGenerator>>,
    retry_attempts: Option<u32>,
    retry_delay: Option<Duration>,
}

impl RecipeExtractorBuilder {
    /// Use this configuration instead of the defaults
    ///
    /// # Example
    /// ```
    /// use recitube::{AppConfig, RecipeExtractor};
    ///
    /// let builder = RecipeExtractor::builder().config(AppConfig::default());
    /// ```
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Resolve credentials from this store instead of the configured one
    pub fn secrets(mut self, secrets: Arc<dyn SecretStore>) -> Self {
        self.secrets = Some(secrets);
        self
    }

    /// Use a custom transcript source
    pub fn transcript_source(mut self, source: Arc<dyn TranscriptSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Use a custom text-generation backend
    pub fn generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Override the number of retries after a failed attempt
    ///
    /// # Example
    /// ```
    /// use recitube::RecipeExtractor;
    ///
    /// let builder = RecipeExtractor::builder().retry_attempts(1);
    /// ```
    pub fn retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = Some(attempts);
        self
    }

    /// Override the pause between attempts
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = Some(delay);
        self
    }

    /// Build the extractor
    ///
    /// # Errors
    /// Returns `SetupError` if:
    /// - The secret store cannot be opened
    /// - A required secret is missing
    /// - The configured provider is unknown
    /// - An HTTP client cannot be created
    pub fn build(self) -> Result<RecipeExtractor, SetupError> {
        let config = self.config.unwrap_or_default();

        let mut retry = RetryPolicy::from(&config.extraction);
        if let Some(attempts) = self.retry_attempts {
            retry.retry_attempts = attempts;
        }
        if let Some(delay) = self.retry_delay {
            retry.retry_delay = delay;
        }

        let mut store = self.secrets;

        let source: Arc<dyn TranscriptSource> = match self.source {
            Some(source) => source,
            None => {
                let secrets = secret_store(&mut store, &config)?;
                Arc::new(YouTubeTranscriptSource::new(
                    &config.transcript,
                    secrets.as_ref(),
                )?)
            }
        };

        let generator: Arc<dyn TextGenerator> = match self.generator {
            Some(generator) => generator,
            None => {
                let secrets = secret_store(&mut store, &config)?;
                Arc::from(ProviderFactory::create(
                    &config.generation,
                    secrets.as_ref(),
                )?)
            }
        };

        Ok(RecipeExtractor::new(source, generator, retry))
    }
}

/// Open the configured secret store on first use
fn secret_store(
    store: &mut Option<Arc<dyn SecretStore>>,
    config: &AppConfig,
) -> Result<Arc<dyn SecretStore>, SetupError> {
    if let Some(store) = store {
        return Ok(Arc::clone(store));
    }

    let opened: Arc<dyn SecretStore> = Arc::from(secrets::from_config(&config.secrets)?);
    *store = Some(Arc::clone(&opened));
    Ok(opened)
}
