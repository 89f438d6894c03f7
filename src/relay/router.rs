use futures_util::{StreamExt, stream};
use std::sync::Arc;
use tracing::{debug, warn};

use super::adapters::{MessageSink, Translator};
use super::error::describe;
use super::registry::Destination;
use super::{Message, RelayError};

/// Default number of subscribers served concurrently for one message.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Result of delivering one message to one subscriber: the id of the
/// posted translation, or the isolated failure.
pub type Outcome = Result<String, RelayError>;

/// Fans a message out to every subscriber of a snapshot.
pub struct TranslationRouter {
    translator: Arc<dyn Translator>,
    sink: Arc<dyn MessageSink>,
    concurrency: usize,
}

impl TranslationRouter {
    pub fn new(translator: Arc<dyn Translator>, sink: Arc<dyn MessageSink>) -> Self {
        Self {
            translator,
            sink,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Sets the fan-out bound. Zero is treated as one.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub const fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Translates `message` for every subscriber and posts the results.
    ///
    /// Outcomes are returned in snapshot order. A failing subscriber never
    /// stops delivery to the others, and the call returns only once every
    /// subscriber has been served.
    pub async fn route(
        &self,
        message: &Message,
        subscribers: &[Destination],
    ) -> Vec<(String, Outcome)> {
        let deliveries: Vec<_> = subscribers
            .iter()
            .map(|destination| self.deliver_to(message, destination))
            .collect();

        stream::iter(deliveries)
            .buffered(self.concurrency)
            .collect()
            .await
    }

    async fn deliver_to(&self, message: &Message, destination: &Destination) -> (String, Outcome) {
        let outcome = self.deliver(message, destination).await;
        (destination.room_id.clone(), outcome)
    }

    async fn deliver(&self, message: &Message, destination: &Destination) -> Outcome {
        let translated = self
            .translator
            .translate(&message.text, &destination.language)
            .await
            .map_err(|e| RelayError::Translation {
                language: destination.language.clone(),
                reason: describe(&e),
            });

        let outcome = match translated {
            Ok(text) => self
                .sink
                .post_message(&destination.room_id, &text)
                .await
                .map_err(|e| RelayError::Delivery {
                    room_id: destination.room_id.clone(),
                    reason: describe(&e),
                }),
            Err(e) => Err(e),
        };

        match &outcome {
            Ok(posted_id) => debug!(
                message_id = %message.id,
                room_id = %destination.room_id,
                language = %destination.language,
                %posted_id,
                "Delivered translation"
            ),
            Err(e) => warn!(
                message_id = %message.id,
                room_id = %destination.room_id,
                error = %e,
                "Subscriber delivery failed"
            ),
        }

        outcome
    }
}
