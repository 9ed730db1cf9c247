//! Global configuration loader for WebCoach.
//!
//! Reads `config.toml` from the data directory (`~/.webcoach/` in production)
//! and deserializes it into [`GlobalConfig`]. Falls back to sensible defaults
//! when the file is missing or malformed.

use std::path::{Path, PathBuf};

use secrecy::SecretString;
use webcoach_types::config::{GlobalConfig, LlmConfig};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "WEBCOACH_DATA_DIR";

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `WEBCOACH_DATA_DIR` environment variable
/// 2. `~/.webcoach`
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".webcoach");
    }

    // Last resort: current directory
    PathBuf::from(".webcoach")
}

/// Load global configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`GlobalConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - If the file exists and parses successfully, returns the parsed config.
pub async fn load_global_config(data_dir: &Path) -> GlobalConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
    };

    match toml::from_str::<GlobalConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            GlobalConfig::default()
        }
    }
}

/// Read the provider API key from the environment variable named by
/// `llm.api_key_env`. Unset or blank yields `None`.
pub fn resolve_api_key(llm: &LlmConfig) -> Option<SecretString> {
    match std::env::var(&llm.api_key_env) {
        Ok(value) if !value.trim().is_empty() => Some(SecretString::from(value)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_global_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.llm.model, "gpt-3.5-turbo");
        assert!(config.chat.system_prompt.is_none());
    }

    #[tokio::test]
    async fn load_global_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
[server]
port = 8080

[llm]
model = "gpt-4o-mini"
base_url = "http://localhost:11434/v1"
temperature = 0.2

[chat]
system_prompt = "You are a terse reviewer."

[auth]
session_ttl_hours = 2
"#,
        )
        .await
        .unwrap();

        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.base_url.as_deref(), Some("http://localhost:11434/v1"));
        assert_eq!(config.llm.temperature, Some(0.2));
        assert_eq!(
            config.chat.system_prompt.as_deref(),
            Some("You are a terse reviewer.")
        );
        assert_eq!(config.auth.session_ttl_hours, 2);
    }

    #[tokio::test]
    async fn load_global_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_resolve_data_dir_from_env() {
        // SAFETY: This test is single-threaded and restores the env var immediately.
        unsafe {
            std::env::set_var(DATA_DIR_ENV, "/tmp/test-webcoach");
        }
        let dir = resolve_data_dir();
        assert_eq!(dir, PathBuf::from("/tmp/test-webcoach"));
        unsafe {
            std::env::remove_var(DATA_DIR_ENV);
        }
    }

    #[test]
    fn test_resolve_api_key() {
        let llm = LlmConfig {
            api_key_env: "WEBCOACH_TEST_API_KEY".to_string(),
            ..Default::default()
        };
        // SAFETY: the variable name is unique to this test.
        unsafe {
            std::env::set_var("WEBCOACH_TEST_API_KEY", "sk-test");
        }
        let key = resolve_api_key(&llm).unwrap();
        assert_eq!(key.expose_secret(), "sk-test");

        unsafe {
            std::env::set_var("WEBCOACH_TEST_API_KEY", "  ");
        }
        assert!(resolve_api_key(&llm).is_none());

        unsafe {
            std::env::remove_var("WEBCOACH_TEST_API_KEY");
        }
        assert!(resolve_api_key(&llm).is_none());
    }
}
