use serde::{Deserialize, Serialize};

/// A chat message as fetched from a room.
///
/// Field names follow the Spark wire format so the adapter can deserialize
/// messages directly. Messages without text (file shares, cards) carry an
/// empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Room-unique identifier, ordered by arrival within the room.
    pub id: String,
    /// Plain-text body.
    #[serde(default)]
    pub text: String,
    /// Identifier of the author.
    #[serde(default, rename = "personId")]
    pub author_id: String,
    /// Contact address (email) of the author.
    #[serde(default, rename = "personEmail")]
    pub author_email: String,
    /// Identifier of the owning room.
    #[serde(default, rename = "roomId")]
    pub room_id: String,
}

impl Message {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            author_id: String::new(),
            author_email: String::new(),
            room_id: String::new(),
        }
    }

    #[must_use]
    pub fn with_author(mut self, author_id: impl Into<String>, email: impl Into<String>) -> Self {
        self.author_id = author_id.into();
        self.author_email = email.into();
        self
    }

    #[must_use]
    pub fn in_room(mut self, room_id: impl Into<String>) -> Self {
        self.room_id = room_id.into();
        self
    }
}
