//! Subcommand implementations.

use anyhow::{Result, bail};
use std::path::Path;

use crate::cli::RoomTarget;
use crate::config::{ConfigFile, ConfigManager, resolve_spark};
use crate::spark::SparkClient;

/// Room message dump.
pub mod messages;

/// Relay command handler.
pub mod relay;

/// Room management handlers.
pub mod rooms;

/// Loads `path`, or the default config file when no path was given.
pub fn load_config(path: Option<&Path>) -> Result<ConfigFile> {
    let manager = path.map_or_else(ConfigManager::new, ConfigManager::with_path);
    manager.load_or_default()
}

/// Builds a Spark client from the `[spark]` settings.
pub fn connect(config: &ConfigFile) -> Result<SparkClient> {
    let spark = resolve_spark(config)?;
    Ok(SparkClient::new(spark.endpoint, spark.token))
}

/// Resolves a room given by id or title. The id wins when both are set.
pub async fn resolve_room_id(client: &SparkClient, target: &RoomTarget) -> Result<String> {
    if let Some(id) = &target.id {
        return Ok(id.clone());
    }

    let Some(title) = &target.title else {
        bail!("Either --id or --title is required");
    };

    match client.find_room_id_by_title(title).await? {
        Some(id) => Ok(id),
        None => bail!("Room '{title}' not found"),
    }
}
