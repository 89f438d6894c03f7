//! Relay core: cursor tracking, command interpretation, the subscriber
//! registry, fan-out routing and the polling loop that ties them together.

/// Capability traits for the messaging and translation backends.
pub mod adapters;
/// In-band `/translate` and `/stop` commands.
pub mod command;
pub mod cursor;
/// Scripted demo conversation.
pub mod demo;
mod error;
mod message;
pub mod poller;
pub mod registry;
pub mod router;
mod stats;

pub use adapters::{MessageSink, MessageSource, RoomDirectory, Translator};
pub use command::{Command, interpret};
pub use cursor::{Advance, advance};
pub use error::RelayError;
pub use message::Message;
pub use poller::{PollingLoop, RelayConfig, SourceRoom};
pub use registry::{Destination, Subscriber, SubscriberRegistry, resolve_destination};
pub use router::{Outcome, TranslationRouter};
pub use stats::RelayStats;
