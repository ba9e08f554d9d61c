use crate::config::SecretsConfig;
use crate::error::SecretError;
use log::debug;
use std::collections::HashMap;
use std::env;
use std::path::Path;

/// Source of credentials, consulted only while the service is being built
pub trait SecretStore: Send + Sync {
    fn get_secret(&self, name: &str) -> Result<String, SecretError>;
}

/// Reads each secret from an environment variable.
///
/// The variable name is the secret name upper-cased with `-` and `.` replaced
/// by `_`, so `recitube-backend-replicate-api-key` is read from
/// `RECITUBE_BACKEND_REPLICATE_API_KEY`.
#[derive(Debug, Default, Clone)]
pub struct EnvSecretStore;

impl EnvSecretStore {
    pub fn variable_name(secret_name: &str) -> String {
        secret_name
            .chars()
            .map(|c| match c {
                '-' | '.' => '_',
                c => c.to_ascii_uppercase(),
            })
            .collect()
    }
}

impl SecretStore for EnvSecretStore {
    fn get_secret(&self, name: &str) -> Result<String, SecretError> {
        let var = Self::variable_name(name);
        debug!("Looking up secret '{}' in ${}", name, var);
        env::var(&var).map_err(|_| SecretError::NotFound(name.to_string()))
    }
}

/// Secrets held in a single JSON object of `name -> value` strings
#[derive(Debug, Clone)]
pub struct JsonSecretStore {
    secrets: HashMap<String, String>,
}

impl JsonSecretStore {
    pub fn from_json(blob: &str) -> Result<Self, SecretError> {
        let secrets: HashMap<String, String> =
            serde_json::from_str(blob).map_err(|e| SecretError::InvalidBlob(e.to_string()))?;
        Ok(Self { secrets })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SecretError> {
        let blob = std::fs::read_to_string(path)?;
        Self::from_json(&blob)
    }

    pub fn from_env(var: &str) -> Result<Self, SecretError> {
        let blob = env::var(var).map_err(|_| SecretError::NotFound(var.to_string()))?;
        Self::from_json(&blob)
    }
}

impl SecretStore for JsonSecretStore {
    fn get_secret(&self, name: &str) -> Result<String, SecretError> {
        self.secrets
            .get(name)
            .cloned()
            .ok_or_else(|| SecretError::NotFound(name.to_string()))
    }
}

/// Create the secret store selected by configuration
pub fn from_config(config: &SecretsConfig) -> Result<Box<dyn SecretStore>, SecretError> {
    match config {
        SecretsConfig::Env => Ok(Box::new(EnvSecretStore)),
        SecretsConfig::Json {
            path: Some(path), ..
        } => Ok(Box::new(JsonSecretStore::from_file(path)?)),
        SecretsConfig::Json { path: None, env_var } => {
            Ok(Box::new(JsonSecretStore::from_env(env_var)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_name() {
        assert_eq!(
            EnvSecretStore::variable_name("recitube-backend-replicate-api-key"),
            "RECITUBE_BACKEND_REPLICATE_API_KEY"
        );
        assert_eq!(EnvSecretStore::variable_name("proxy.user"), "PROXY_USER");
    }

    #[test]
    fn test_env_store_reads_variable() {
        env::set_var("RECITUBE_TEST_SECRET_STORE_TOKEN", "s3cret");
        let store = EnvSecretStore;
        assert_eq!(
            store.get_secret("recitube-test-secret-store-token").unwrap(),
            "s3cret"
        );
        env::remove_var("RECITUBE_TEST_SECRET_STORE_TOKEN");
    }

    #[test]
    fn test_env_store_missing() {
        let store = EnvSecretStore;
        let err = store
            .get_secret("recitube-test-definitely-not-set")
            .unwrap_err();
        assert!(matches!(err, SecretError::NotFound(name) if name == "recitube-test-definitely-not-set"));
    }

    #[test]
    fn test_json_store_lookup() {
        let store = JsonSecretStore::from_json(
            r#"{"recitube-backend-replicate-api-key": "r8_abc", "recitube-backend-smartproxy-username": "user"}"#,
        )
        .unwrap();

        assert_eq!(
            store.get_secret("recitube-backend-replicate-api-key").unwrap(),
            "r8_abc"
        );
        assert!(matches!(
            store.get_secret("missing"),
            Err(SecretError::NotFound(_))
        ));
    }

    #[test]
    fn test_json_store_rejects_non_object() {
        assert!(matches!(
            JsonSecretStore::from_json(r#"["a", "b"]"#),
            Err(SecretError::InvalidBlob(_))
        ));
        assert!(matches!(
            JsonSecretStore::from_json(r#"{"key": 42}"#),
            Err(SecretError::InvalidBlob(_))
        ));
    }

    #[test]
    fn test_from_config_json_env() {
        env::set_var("RECITUBE_TEST_SECRETS_BLOB", r#"{"name": "value"}"#);
        let store = from_config(&SecretsConfig::Json {
            path: None,
            env_var: "RECITUBE_TEST_SECRETS_BLOB".to_string(),
        })
        .unwrap();
        assert_eq!(store.get_secret("name").unwrap(), "value");
        env::remove_var("RECITUBE_TEST_SECRETS_BLOB");
    }

    #[test]
    fn test_from_config_missing_file() {
        let result = from_config(&SecretsConfig::Json {
            path: Some("/nonexistent/recitube-secrets.json".to_string()),
            env_var: "UNUSED".to_string(),
        });
        assert!(matches!(result, Err(SecretError::Io(_))));
    }
}
