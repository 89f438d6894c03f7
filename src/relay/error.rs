use thiserror::Error;

/// Errors raised by the relay core.
///
/// None of these are fatal to a polling loop: each one is logged and either
/// isolated to a single subscriber or downgraded to a skipped iteration.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The polled room returned no messages, so there is nothing to advance
    /// the cursor to.
    #[error("Room has no messages")]
    EmptyRoom,

    /// The translation backend rejected a message for one subscriber.
    #[error("Translation to '{language}' failed: {reason}")]
    Translation { language: String, reason: String },

    /// The messaging backend rejected a translated message.
    #[error("Delivery to room {room_id} failed: {reason}")]
    Delivery { room_id: String, reason: String },

    /// The message source could not be reached after all retries.
    #[error("Message source unavailable after {attempts} attempt(s): {reason}")]
    AdapterUnavailable { attempts: u32, reason: String },

    /// A stop signal arrived while waiting on the message source.
    #[error("Relay stopped")]
    Stopped,
}

/// Renders an adapter error with its full context chain.
pub(crate) fn describe(err: &anyhow::Error) -> String {
    format!("{err:#}")
}
