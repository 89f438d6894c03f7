//! Capability interfaces the relay core depends on.
//!
//! The core never talks to a backend directly. The Spark client implements
//! the room and message traits, the translation client implements
//! [`Translator`], and tests substitute in-memory fakes.

use anyhow::Result;
use async_trait::async_trait;

use super::Message;

/// Reads the messages currently present in a room.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Returns the room's messages, newest first.
    async fn fetch_messages(&self, room_id: &str) -> Result<Vec<Message>>;
}

/// Looks up and creates rooms.
#[async_trait]
pub trait RoomDirectory: Send + Sync {
    /// Returns the id of the first room whose title matches exactly.
    async fn find_room_id_by_title(&self, title: &str) -> Result<Option<String>>;

    /// Creates a room and returns its id.
    async fn create_room(&self, title: &str) -> Result<String>;
}

/// Translates text into a target language.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, language: &str) -> Result<String>;
}

/// Posts text into a room.
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Posts `text` and returns the id of the created message.
    async fn post_message(&self, room_id: &str, text: &str) -> Result<String>;
}
