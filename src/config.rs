use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Text-generation backend settings
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Transcript retrieval settings
    #[serde(default)]
    pub transcript: TranscriptConfig,
    /// Retry policy of the extraction pipeline
    #[serde(default)]
    pub extraction: ExtractionConfig,
    /// Where credentials are looked up
    #[serde(default)]
    pub secrets: SecretsConfig,
}

/// Configuration for the HTTP shell
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allow any origin, method and header
    #[serde(default)]
    pub cors_permissive: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_permissive: false,
        }
    }
}

/// Configuration for the text-generation backend
#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    /// Backend name: "replicate", "openai" or "anthropic"
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Model identifier (e.g., "meta/meta-llama-3-8b-instruct", "gpt-4o-mini")
    #[serde(default = "default_model")]
    pub model: String,
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Nucleus-sampling threshold
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    /// API key (takes precedence over the secret store)
    pub api_key: Option<String>,
    /// Name of the secret holding the API key
    #[serde(default = "default_api_key_secret")]
    pub api_key_secret: String,
    /// Base URL for API endpoint (for custom or proxy endpoints)
    pub base_url: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_generation_timeout")]
    pub timeout_secs: u64,
    /// Delay between prediction status polls in milliseconds (Replicate only)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            top_p: default_top_p(),
            api_key: None,
            api_key_secret: default_api_key_secret(),
            base_url: None,
            timeout_secs: default_generation_timeout(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl GenerationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Configuration for the YouTube transcript source
#[derive(Debug, Deserialize, Clone)]
pub struct TranscriptConfig {
    /// Preferred caption languages, most preferred first
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
    /// Base URL of the video site (overridable for tests)
    #[serde(default = "default_youtube_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_transcript_timeout")]
    pub timeout_secs: u64,
    /// Route transcript requests through an HTTPS proxy
    pub proxy: Option<ProxyConfig>,
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            languages: default_languages(),
            base_url: default_youtube_url(),
            timeout_secs: default_transcript_timeout(),
            proxy: None,
        }
    }
}

impl TranscriptConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// HTTPS proxy with credentials resolved from the secret store
#[derive(Debug, Deserialize, Clone)]
pub struct ProxyConfig {
    #[serde(default = "default_proxy_url")]
    pub url: String,
    #[serde(default = "default_proxy_username_secret")]
    pub username_secret: String,
    #[serde(default = "default_proxy_password_secret")]
    pub password_secret: String,
}

/// Retry policy of the extraction orchestrator
#[derive(Debug, Deserialize, Clone)]
pub struct ExtractionConfig {
    /// Additional generation attempts after the first one fails
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    /// Fixed delay between attempts in milliseconds
    #[serde(default)]
    pub retry_delay_ms: u64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            retry_attempts: default_retry_attempts(),
            retry_delay_ms: 0,
        }
    }
}

/// Secret store selection
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum SecretsConfig {
    /// One environment variable per secret
    #[default]
    Env,
    /// A JSON object of secrets, read from a file or an environment variable
    Json {
        path: Option<String>,
        #[serde(default = "default_secrets_env_var")]
        env_var: String,
    },
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_provider() -> String {
    "replicate".to_string()
}

fn default_model() -> String {
    "meta/meta-llama-3-8b-instruct".to_string()
}

fn default_temperature() -> f32 {
    0.75
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_top_p() -> f32 {
    1.0
}

fn default_api_key_secret() -> String {
    "recitube-backend-replicate-api-key".to_string()
}

fn default_generation_timeout() -> u64 {
    120
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_languages() -> Vec<String> {
    vec!["en".to_string()]
}

fn default_youtube_url() -> String {
    "https://www.youtube.com".to_string()
}

fn default_transcript_timeout() -> u64 {
    30
}

fn default_proxy_url() -> String {
    "https://gate.smartproxy.com:7000".to_string()
}

fn default_proxy_username_secret() -> String {
    "recitube-backend-smartproxy-username".to_string()
}

fn default_proxy_password_secret() -> String {
    "recitube-backend-smartproxy-password".to_string()
}

fn default_retry_attempts() -> u32 {
    2
}

fn default_secrets_env_var() -> String {
    "RECITUBE_SECRETS".to_string()
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with RECITUBE__ prefix
    /// 2. recitube.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: RECITUBE__GENERATION__PROVIDER.
    /// Lists are comma separated: RECITUBE__TRANSCRIPT__LANGUAGES=en,de
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }
}

/// Load configuration from file and environment variables
///
/// See [`AppConfig::load`] for the precedence rules.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("recitube").required(false))
        // Use double underscore for nested: RECITUBE__EXTRACTION__RETRY_ATTEMPTS
        .add_source(
            Environment::with_prefix("RECITUBE")
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("transcript.languages")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(toml: &str) -> AppConfig {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_default_values() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.generation.provider, "replicate");
        assert_eq!(config.generation.model, "meta/meta-llama-3-8b-instruct");
        assert_eq!(config.generation.temperature, 0.75);
        assert_eq!(config.generation.max_tokens, 1000);
        assert_eq!(config.generation.top_p, 1.0);
        assert_eq!(config.transcript.languages, vec!["en".to_string()]);
        assert!(config.transcript.proxy.is_none());
        assert_eq!(config.extraction.retry_attempts, 2);
        assert_eq!(config.extraction.retry_delay_ms, 0);
        assert!(matches!(config.secrets, SecretsConfig::Env));
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = from_toml("");
        assert_eq!(config.generation.provider, "replicate");
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.transcript.base_url, "https://www.youtube.com");
    }

    #[test]
    fn test_partial_sections() {
        let config = from_toml(
            r#"
            [generation]
            provider = "openai"
            model = "gpt-4o-mini"

            [extraction]
            retry_attempts = 5

            [transcript.proxy]
            username_secret = "proxy-user"
            "#,
        );

        assert_eq!(config.generation.provider, "openai");
        assert_eq!(config.generation.model, "gpt-4o-mini");
        assert_eq!(config.generation.max_tokens, 1000);
        assert_eq!(config.extraction.retry_attempts, 5);

        let proxy = config.transcript.proxy.unwrap();
        assert_eq!(proxy.url, "https://gate.smartproxy.com:7000");
        assert_eq!(proxy.username_secret, "proxy-user");
        assert_eq!(proxy.password_secret, "recitube-backend-smartproxy-password");
    }

    #[test]
    fn test_json_secrets_source() {
        let config = from_toml(
            r#"
            [secrets]
            source = "json"
            path = "/run/secrets/recitube.json"
            "#,
        );

        match config.secrets {
            SecretsConfig::Json { path, env_var } => {
                assert_eq!(path.as_deref(), Some("/run/secrets/recitube.json"));
                assert_eq!(env_var, "RECITUBE_SECRETS");
            }
            other => panic!("Expected json secrets, got {:?}", other),
        }
    }

    #[test]
    fn test_durations() {
        let config = AppConfig::default();
        assert_eq!(config.generation.timeout(), Duration::from_secs(120));
        assert_eq!(config.generation.poll_interval(), Duration::from_millis(500));
        assert_eq!(config.transcript.timeout(), Duration::from_secs(30));
    }
}
