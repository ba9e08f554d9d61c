use crate::config::GenerationConfig;
use crate::error::SetupError;
use crate::providers::{AnthropicProvider, OpenAIProvider, ReplicateProvider, TextGenerator};
use crate::secrets::SecretStore;
use log::info;

pub struct ProviderFactory;

impl ProviderFactory {
    /// Create the configured backend.
    ///
    /// The API key comes from `config.api_key` when set, otherwise from the
    /// secret named by `config.api_key_secret`.
    pub fn create(
        config: &GenerationConfig,
        secrets: &dyn SecretStore,
    ) -> Result<Box<dyn TextGenerator>, SetupError> {
        let provider_name = config.provider.as_str();
        if !Self::available_providers().contains(&provider_name) {
            return Err(SetupError::UnknownProvider(provider_name.to_string()));
        }

        let api_key = match &config.api_key {
            Some(key) => key.clone(),
            None => secrets.get_secret(&config.api_key_secret)?,
        };

        info!(
            "Using '{}' generation backend with model '{}'",
            provider_name, config.model
        );

        let provider: Box<dyn TextGenerator> = match provider_name {
            "replicate" => Box::new(ReplicateProvider::new(config, api_key)?),
            "openai" => Box::new(OpenAIProvider::new(config, api_key)?),
            "anthropic" => Box::new(AnthropicProvider::new(config, api_key)?),
            other => return Err(SetupError::UnknownProvider(other.to_string())),
        };
        Ok(provider)
    }

    /// List all available provider names
    pub fn available_providers() -> Vec<&'static str> {
        vec!["replicate", "openai", "anthropic"]
    }
}
