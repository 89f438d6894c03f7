//! Scripted demo conversation.
//!
//! Posts a short multilingual conversation into the source room so a fresh
//! room shows the relay working end to end: a subscription, some content,
//! a `/stop`, and a re-subscription in another language.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::info;

use super::adapters::MessageSink;

/// Messages posted at each demo step. Steps not listed post nothing.
pub const DEMO_SCRIPT: &[(u64, &[&str])] = &[
    (
        0,
        &[
            "/translate de",
            "Hi Bob! How's that estimate going?",
            "Como esta? Habla ingles?",
        ],
    ),
    (1, &["That is fantastic!", "Parlez vous francais?"]),
    (
        3,
        &["/stop", "My German is getting rusty", "Where is the kaboom?"],
    ),
    (
        5,
        &["/translate ru", "Eppure si muove", "Como se dice butter"],
    ),
];

/// Returns the messages for a demo step.
pub fn demo_step(step: u64) -> &'static [&'static str] {
    DEMO_SCRIPT
        .iter()
        .find(|(s, _)| *s == step)
        .map(|(_, lines)| *lines)
        .unwrap_or_default()
}

/// Posts the demo script into `room_id`, one step per `interval`.
///
/// Returns early when a stop is signalled.
pub async fn run_demo(
    sink: Arc<dyn MessageSink>,
    room_id: String,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let last_step = DEMO_SCRIPT.iter().map(|(s, _)| *s).max().unwrap_or(0);

    for step in 0..=last_step {
        for line in demo_step(step) {
            sink.post_message(&room_id, line)
                .await
                .with_context(|| format!("Failed to post demo message at step {step}"))?;
        }
        if !demo_step(step).is_empty() {
            info!(step, "Posted demo messages");
        }

        tokio::select! {
            () = tokio::time::sleep(interval) => {}
            _ = shutdown.wait_for(|stop| *stop) => return Ok(()),
        }
    }

    Ok(())
}
