//! Spark (Webex) messaging backend.

mod client;

pub use client::{DEFAULT_ENDPOINT, Room, SparkClient};
