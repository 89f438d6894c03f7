use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

use crate::paths;
use crate::relay::RelayConfig;
use crate::relay::router::DEFAULT_CONCURRENCY;
use crate::spark::DEFAULT_ENDPOINT;

/// Environment variable read for the bot token when `token_env` is not set.
pub const DEFAULT_TOKEN_ENV: &str = "SPARK_BOT_TOKEN";

/// Relay defaults in the `[babelfish]` section of config.toml.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelaySettings {
    /// Default translation provider name.
    pub provider: Option<String>,
    /// Default model name.
    pub model: Option<String>,
    /// Seconds between polls of the source room.
    pub interval_secs: Option<u64>,
    /// Subscribers served concurrently per message.
    pub concurrency: Option<usize>,
    /// Extra fetch attempts when the messaging backend is unreachable.
    pub max_retries: Option<u32>,
    /// Initial retry backoff in milliseconds.
    pub backoff_ms: Option<u64>,
}

/// Messaging backend settings in the `[spark]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SparkConfig {
    /// REST endpoint. Defaults to the public Webex API.
    pub endpoint: Option<String>,
    /// Bot token stored directly in config (not recommended).
    pub token: Option<String>,
    /// Environment variable name containing the bot token.
    pub token_env: Option<String>,
}

impl SparkConfig {
    /// Gets the bot token, preferring the environment over the config file.
    pub fn get_token(&self) -> Option<String> {
        let env_var = self.token_env.as_deref().unwrap_or(DEFAULT_TOKEN_ENV);
        if let Ok(token) = std::env::var(env_var)
            && !token.is_empty()
        {
            return Some(token);
        }
        self.token.clone()
    }
}

/// Configuration for a translation provider.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// The OpenAI-compatible API endpoint URL.
    pub endpoint: String,
    /// API key stored directly in config (not recommended).
    #[serde(default)]
    pub api_key: Option<String>,
    /// Environment variable name containing the API key.
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// List of available models for this provider.
    #[serde(default)]
    pub models: Vec<String>,
}

impl ProviderConfig {
    /// Gets the API key, preferring environment variable over config file.
    pub fn get_api_key(&self) -> Option<String> {
        if let Some(env_var) = &self.api_key_env
            && let Ok(key) = std::env::var(env_var)
            && !key.is_empty()
        {
            return Some(key);
        }
        self.api_key.clone()
    }

    /// Returns `true` if this provider requires an API key.
    pub const fn requires_api_key(&self) -> bool {
        self.api_key.is_some() || self.api_key_env.is_some()
    }
}

/// The complete configuration file structure.
///
/// Corresponds to `~/.config/babelfish/config.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub babelfish: RelaySettings,
    #[serde(default)]
    pub spark: SparkConfig,
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

/// Resolved messaging backend settings.
#[derive(Debug, Clone)]
pub struct ResolvedSpark {
    pub endpoint: String,
    pub token: String,
}

/// Resolved settings for a relay run.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// The selected provider name.
    pub provider_name: String,
    /// The translation API endpoint URL.
    pub endpoint: String,
    /// The model to use for translation.
    pub model: String,
    /// The API key (if required).
    pub api_key: Option<String>,
    /// Subscribers served concurrently per message.
    pub concurrency: usize,
    pub relay: RelayConfig,
}

/// CLI overrides that take precedence over config file values.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub interval_secs: Option<u64>,
    pub iterations: Option<u64>,
    pub concurrency: Option<usize>,
}

/// Resolves the messaging backend settings.
///
/// # Errors
///
/// Returns an error if no bot token is configured.
pub fn resolve_spark(config_file: &ConfigFile) -> Result<ResolvedSpark> {
    let spark = &config_file.spark;

    let Some(token) = spark.get_token() else {
        let env_var = spark.token_env.as_deref().unwrap_or(DEFAULT_TOKEN_ENV);
        bail!(
            "Missing Spark bot token\n\n\
             Set the {env_var} environment variable:\n  \
             export {env_var}=\"your-bot-token\"\n\n\
             Or set token in the [spark] section of ~/.config/babelfish/config.toml"
        );
    };

    Ok(ResolvedSpark {
        endpoint: spark
            .endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
        token,
    })
}

/// Resolves relay settings by merging CLI options with config file settings.
///
/// CLI options take precedence over config file values, which take
/// precedence over built-in defaults.
///
/// # Errors
///
/// Returns an error if the provider or model is missing, the provider is
/// not configured, or a required API key is not set.
pub fn resolve_config(options: &ResolveOptions, config_file: &ConfigFile) -> Result<ResolvedConfig> {
    let settings = &config_file.babelfish;

    let provider_name = options
        .provider
        .as_ref()
        .or(settings.provider.as_ref())
        .cloned()
        .ok_or_else(|| {
            anyhow::anyhow!(
                "Missing required configuration: 'provider'\n\n\
                 Please provide it via:\n  \
                 - CLI option: babelfish relay --provider <name>\n  \
                 - Config file: ~/.config/babelfish/config.toml"
            )
        })?;

    let provider_config = config_file.providers.get(&provider_name).ok_or_else(|| {
        let mut available: Vec<_> = config_file.providers.keys().map(String::as_str).collect();
        available.sort_unstable();
        if available.is_empty() {
            anyhow::anyhow!(
                "Provider '{provider_name}' not found\n\n\
                 No providers configured. Add providers to ~/.config/babelfish/config.toml"
            )
        } else {
            anyhow::anyhow!(
                "Provider '{provider_name}' not found\n\n\
                 Available providers:\n  \
                 - {}",
                available.join("\n  - ")
            )
        }
    })?;

    let model = options
        .model
        .as_ref()
        .or(settings.model.as_ref())
        .cloned()
        .ok_or_else(|| {
            anyhow::anyhow!(
                "Missing required configuration: 'model'\n\n\
                 Please provide it via:\n  \
                 - CLI option: babelfish relay --model <name>\n  \
                 - Config file: ~/.config/babelfish/config.toml"
            )
        })?;

    if !provider_config.models.is_empty() && !provider_config.models.contains(&model) {
        warn!(
            %model,
            provider = %provider_name,
            configured = %provider_config.models.join(", "),
            "Model is not in the provider's configured models list, proceeding anyway"
        );
    }

    let api_key = provider_config.get_api_key();

    if provider_config.requires_api_key() && api_key.is_none() {
        let env_var = provider_config.api_key_env.as_deref().unwrap_or("API_KEY");
        bail!(
            "Provider '{provider_name}' requires an API key\n\n\
             Set the {env_var} environment variable:\n  \
             export {env_var}=\"your-api-key\"\n\n\
             Or set api_key in ~/.config/babelfish/config.toml"
        );
    }

    let defaults = RelayConfig::default();
    let relay = RelayConfig {
        interval: options
            .interval_secs
            .or(settings.interval_secs)
            .map_or(defaults.interval, Duration::from_secs),
        max_iterations: options.iterations,
        max_retries: settings.max_retries.unwrap_or(defaults.max_retries),
        backoff: settings
            .backoff_ms
            .map_or(defaults.backoff, Duration::from_millis),
    };

    Ok(ResolvedConfig {
        provider_name,
        endpoint: provider_config.endpoint.clone(),
        model,
        api_key,
        concurrency: options
            .concurrency
            .or(settings.concurrency)
            .unwrap_or(DEFAULT_CONCURRENCY),
        relay,
    })
}

/// Manages loading and saving configuration files.
pub struct ConfigManager {
    config_path: PathBuf,
    explicit: bool,
}

impl ConfigManager {
    /// Creates a manager for the default location.
    ///
    /// Configuration is stored at `$XDG_CONFIG_HOME/babelfish/config.toml`
    /// or `~/.config/babelfish/config.toml` if `XDG_CONFIG_HOME` is not set.
    pub fn new() -> Self {
        Self {
            config_path: paths::config_dir().join("config.toml"),
            explicit: false,
        }
    }

    /// Creates a manager for a file given on the command line.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            explicit: true,
        }
    }

    pub fn load(&self) -> Result<ConfigFile> {
        let contents = fs::read_to_string(&self.config_path).with_context(|| {
            format!("Failed to read config file: {}", self.config_path.display())
        })?;

        toml::from_str(&contents).with_context(|| {
            format!("Failed to parse config file: {}", self.config_path.display())
        })
    }

    /// Loads the config file.
    ///
    /// A missing default file yields an empty configuration so that
    /// environment variables alone are enough. A file named explicitly must
    /// exist, and a file that exists must parse.
    pub fn load_or_default(&self) -> Result<ConfigFile> {
        if !self.explicit && !self.config_path.exists() {
            return Ok(ConfigFile::default());
        }
        self.load()
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
