//! Configuration loader for threadbot.
//!
//! Reads `threadbot.toml` from the data directory (`~/.threadbot/` by
//! default) into [`BotConfig`], falling back to defaults when the file is
//! missing or malformed. Credentials never live in the file: the API key
//! comes from the environment and is held as a [`SecretString`].

use std::path::{Path, PathBuf};

use secrecy::SecretString;

use threadbot_types::config::BotConfig;
use threadbot_types::error::ConfigError;

pub const CONFIG_FILE_NAME: &str = "threadbot.toml";
pub const DATA_DIR_ENV: &str = "THREADBOT_DATA_DIR";
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const ASSISTANT_ID_ENV: &str = "THREADBOT_ASSISTANT_ID";

/// Resolve the data directory.
///
/// Uses `THREADBOT_DATA_DIR` if set, otherwise `~/.threadbot`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".threadbot");
    }

    // Last resort: current directory
    PathBuf::from(".threadbot")
}

/// Load configuration from `{data_dir}/threadbot.toml`.
///
/// - If the file does not exist, returns [`BotConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - Otherwise returns the parsed config.
///
/// Environment overrides are applied afterwards in every case.
pub async fn load_bot_config(data_dir: &Path) -> BotConfig {
    let config_path = data_dir.join(CONFIG_FILE_NAME);

    let mut config = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => match toml::from_str::<BotConfig>(&content) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(
                    "Failed to parse {}: {err}, using defaults",
                    config_path.display()
                );
                BotConfig::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No {CONFIG_FILE_NAME} found at {}, using defaults", config_path.display());
            BotConfig::default()
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            BotConfig::default()
        }
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config
}

/// Apply environment overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(config: &mut BotConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(id) = lookup(ASSISTANT_ID_ENV).filter(|v| !v.trim().is_empty()) {
        config.assistant_id = Some(id.trim().to_string());
    }
}

/// Settings that must be present before any remote call can be made.
pub struct Credentials {
    pub api_key: SecretString,
    pub assistant_id: String,
}

/// Collect the API key and assistant id, failing if either is missing.
pub fn resolve_credentials<F>(config: &BotConfig, lookup: F) -> Result<Credentials, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let api_key = lookup(API_KEY_ENV)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingApiKey(API_KEY_ENV.to_string()))?;
    let assistant_id = config
        .assistant_id
        .clone()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingAssistantId(ASSISTANT_ID_ENV.to_string()))?;

    validate(config)?;

    Ok(Credentials {
        api_key: SecretString::from(api_key),
        assistant_id,
    })
}

/// Reject configurations the runtime cannot work with.
pub fn validate(config: &BotConfig) -> Result<(), ConfigError> {
    if config.allowed_models.is_empty() {
        return Err(ConfigError::Invalid("allowed_models must not be empty".to_string()));
    }
    if config.poll_interval_ms == 0 {
        return Err(ConfigError::Invalid("poll_interval_ms must be positive".to_string()));
    }
    if config.max_segment_chars == 0 {
        return Err(ConfigError::Invalid("max_segment_chars must be positive".to_string()));
    }
    let defaults = config.session_config(None, None, None);
    defaults
        .validate(&config.allowed_models)
        .map_err(|e| ConfigError::Invalid(format!("default conversation settings: {e}")))
}
