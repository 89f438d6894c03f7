//! The polling loop driving one source room.
//!
//! Each source room gets its own [`PollingLoop`] with its own cursor and
//! subscriber registry. Within an iteration everything is sequential:
//! commands are applied in arrival order, so a `/stop` takes effect before
//! any content that follows it in the same batch.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::adapters::{MessageSource, RoomDirectory};
use super::command::{self, Command};
use super::cursor;
use super::error::describe;
use super::registry::{Subscriber, SubscriberRegistry, resolve_destination};
use super::router::TranslationRouter;
use super::stats::RelayStats;
use super::{Message, RelayError};
use crate::translation::is_supported_language;

/// Timing and retry settings for a polling loop.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Delay between iterations.
    pub interval: Duration,
    /// Stop after this many iterations. `None` runs until stopped.
    pub max_iterations: Option<u64>,
    /// Extra fetch attempts per iteration when the source is unreachable.
    pub max_retries: u32,
    /// Delay before the first retry; doubled on each further retry.
    pub backoff: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            max_iterations: None,
            max_retries: 3,
            backoff: Duration::from_millis(500),
        }
    }
}

/// The room being relayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRoom {
    pub id: String,
    /// Used to name destination rooms.
    pub title: String,
}

#[derive(Debug)]
enum PollState {
    Idle,
    Polling,
    Dispatching(Vec<Message>),
    Sleeping,
}

pub struct PollingLoop {
    room: SourceRoom,
    source: Arc<dyn MessageSource>,
    directory: Arc<dyn RoomDirectory>,
    router: TranslationRouter,
    registry: SubscriberRegistry,
    cursor: Option<String>,
    config: RelayConfig,
    stats: RelayStats,
    shutdown: watch::Receiver<bool>,
}

impl PollingLoop {
    pub fn new(
        room: SourceRoom,
        source: Arc<dyn MessageSource>,
        directory: Arc<dyn RoomDirectory>,
        router: TranslationRouter,
        config: RelayConfig,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            room,
            source,
            directory,
            router,
            registry: SubscriberRegistry::new(),
            cursor: None,
            config,
            stats: RelayStats::default(),
            shutdown,
        }
    }

    pub const fn registry(&self) -> &SubscriberRegistry {
        &self.registry
    }

    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    pub const fn stats(&self) -> RelayStats {
        self.stats
    }

    /// Runs until the iteration limit is reached or a stop is signalled.
    ///
    /// A stop signal is honoured at the next state transition: a batch that
    /// is already being dispatched is finished first.
    pub async fn run(&mut self) -> RelayStats {
        info!(room = %self.room.title, room_id = %self.room.id, "Relay started");

        let mut state = PollState::Idle;

        loop {
            if self.stop_requested() {
                info!(room = %self.room.title, "Stop requested");
                break;
            }

            state = match state {
                PollState::Idle => PollState::Polling,
                PollState::Polling => match self.poll().await {
                    Ok(batch) => PollState::Dispatching(batch),
                    Err(RelayError::Stopped) => {
                        info!(room = %self.room.title, "Stop requested");
                        break;
                    }
                    Err(e) => {
                        self.skip_iteration(&e);
                        PollState::Sleeping
                    }
                },
                PollState::Dispatching(batch) => {
                    self.dispatch(batch).await;
                    PollState::Sleeping
                }
                PollState::Sleeping => {
                    self.stats.iterations += 1;
                    if self
                        .config
                        .max_iterations
                        .is_some_and(|limit| self.stats.iterations >= limit)
                    {
                        debug!(room = %self.room.title, "Iteration limit reached");
                        break;
                    }
                    self.pause(self.config.interval).await;
                    PollState::Polling
                }
            };
        }

        info!(
            room = %self.room.title,
            iterations = self.stats.iterations,
            routed = self.stats.messages_routed,
            deliveries = self.stats.deliveries,
            failures = self.stats.failures,
            "Relay finished"
        );
        self.stats
    }

    /// Polls once and dispatches whatever is new, without sleeping.
    pub async fn run_iteration(&mut self) -> Result<(), RelayError> {
        let batch = self.poll().await?;
        self.dispatch(batch).await;
        self.stats.iterations += 1;
        Ok(())
    }

    async fn poll(&mut self) -> Result<Vec<Message>, RelayError> {
        let raw = self.fetch_with_retry().await?;
        let advance = cursor::advance(raw, self.cursor.as_deref())?;

        if advance.cursor_missing {
            warn!(
                room = %self.room.title,
                cursor = ?self.cursor,
                "Last seen message is no longer in the room history; skipping this page"
            );
        }

        debug!(
            room = %self.room.title,
            new = advance.new_messages.len(),
            cursor = %advance.next_cursor,
            "Polled source room"
        );

        self.cursor = Some(advance.next_cursor);
        self.stats.messages_seen += advance.new_messages.len() as u64;
        Ok(advance.new_messages)
    }

    async fn fetch_with_retry(&mut self) -> Result<Vec<Message>, RelayError> {
        let attempts = self.config.max_retries.saturating_add(1);
        let mut delay = self.config.backoff;
        let mut attempt = 0;

        loop {
            attempt += 1;

            let fetched = tokio::select! {
                result = self.source.fetch_messages(&self.room.id) => result,
                () = stopped(&mut self.shutdown) => return Err(RelayError::Stopped),
            };

            let err = match fetched {
                Ok(messages) => return Ok(messages),
                Err(e) => e,
            };

            if attempt >= attempts {
                return Err(RelayError::AdapterUnavailable {
                    attempts,
                    reason: describe(&err),
                });
            }

            warn!(
                room = %self.room.title,
                attempt,
                retry_in_ms = delay.as_millis() as u64,
                error = %describe(&err),
                "Failed to fetch messages, retrying"
            );

            if !self.pause(delay).await {
                return Err(RelayError::Stopped);
            }
            delay = delay.saturating_mul(2);
        }
    }

    fn skip_iteration(&mut self, err: &RelayError) {
        self.stats.skipped_iterations += 1;
        match err {
            RelayError::EmptyRoom => {
                debug!(room = %self.room.title, "Source room is empty, nothing to do");
            }
            _ => error!(room = %self.room.title, error = %err, "Skipping iteration"),
        }
    }

    async fn dispatch(&mut self, batch: Vec<Message>) {
        for message in batch {
            match command::interpret(&message) {
                Command::Subscribe { language } => self.subscribe(&message, language).await,
                Command::Unsubscribe => self.unsubscribe(&message).await,
                Command::None => self.route(&message).await,
            }
        }
    }

    async fn subscribe(&mut self, message: &Message, language: String) {
        let Some(room_id) = self.destination_for(message).await else {
            return;
        };

        if !is_supported_language(&language) {
            warn!(%language, author = %message.author_email, "Unrecognised language code, subscribing anyway");
        }

        let previous = self.registry.register(Subscriber {
            room_id: room_id.clone(),
            author_id: message.author_id.clone(),
            author_email: message.author_email.clone(),
            language: language.clone(),
        });
        self.stats.commands_applied += 1;

        match previous {
            Some(old) => info!(
                author = %message.author_email,
                %room_id,
                from = %old.language,
                to = %language,
                "Subscription updated"
            ),
            None => info!(author = %message.author_email, %room_id, %language, "Subscribed"),
        }
    }

    async fn unsubscribe(&mut self, message: &Message) {
        let Some(room_id) = self.destination_for(message).await else {
            return;
        };

        self.stats.commands_applied += 1;
        if self.registry.unregister(&room_id).is_some() {
            info!(author = %message.author_email, %room_id, "Unsubscribed");
        } else {
            debug!(author = %message.author_email, %room_id, "No subscription to remove");
        }
    }

    async fn destination_for(&mut self, message: &Message) -> Option<String> {
        match resolve_destination(
            self.directory.as_ref(),
            &self.room.title,
            &message.author_email,
        )
        .await
        {
            Ok(room_id) => Some(room_id),
            Err(e) => {
                self.stats.failures += 1;
                error!(
                    message_id = %message.id,
                    author = %message.author_email,
                    error = %describe(&e),
                    "Dropping command, destination room unavailable"
                );
                None
            }
        }
    }

    async fn route(&mut self, message: &Message) {
        // File shares and cards carry no text to translate.
        if message.text.trim().is_empty() {
            debug!(message_id = %message.id, "Message has no text, not relayed");
            return;
        }

        let subscribers = self.registry.active_subscribers();
        if subscribers.is_empty() {
            debug!(message_id = %message.id, "No subscribers, message not relayed");
            return;
        }

        let outcomes = self.router.route(message, &subscribers).await;

        self.stats.messages_routed += 1;
        for (_, outcome) in &outcomes {
            if outcome.is_ok() {
                self.stats.deliveries += 1;
            } else {
                self.stats.failures += 1;
            }
        }
    }

    fn stop_requested(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Sleeps for `duration` unless a stop arrives first. Returns `false`
    /// when interrupted.
    async fn pause(&mut self, duration: Duration) -> bool {
        tokio::select! {
            () = tokio::time::sleep(duration) => true,
            () = stopped(&mut self.shutdown) => false,
        }
    }
}

/// Resolves once the stop flag is raised. A dropped sender means no stop
/// can ever arrive.
async fn stopped(shutdown: &mut watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}
