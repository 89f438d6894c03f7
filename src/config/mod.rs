mod manager;

pub use manager::{
    ConfigFile, ConfigManager, DEFAULT_TOKEN_ENV, ProviderConfig, RelaySettings, ResolveOptions,
    ResolvedConfig, ResolvedSpark, SparkConfig, resolve_config, resolve_spark,
};
