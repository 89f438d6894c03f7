use anyhow::{Context, Result};

use super::{connect, resolve_room_id};
use crate::cli::RoomTarget;
use crate::config::ConfigFile;
use crate::relay::Message;

/// Prints a room's messages as pretty JSON, oldest first.
pub async fn run_messages(config: &ConfigFile, target: &RoomTarget) -> Result<()> {
    let client = connect(config)?;
    let room_id = resolve_room_id(&client, target).await?;

    let messages = client.list_messages(&room_id).await?;
    println!("{}", render(messages)?);

    Ok(())
}

// The backend lists newest first.
fn render(mut messages: Vec<Message>) -> Result<String> {
    messages.reverse();
    serde_json::to_string_pretty(&messages).context("Failed to serialize messages")
}
