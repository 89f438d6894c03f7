use anyhow::{Context, Result};
use std::collections::BTreeMap;
use tracing::{debug, info};

use super::adapters::RoomDirectory;

/// A user receiving translated copies of the source room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscriber {
    /// Destination room the translations are posted into.
    pub room_id: String,
    pub author_id: String,
    pub author_email: String,
    /// Target language code, as typed by the user.
    pub language: String,
}

/// One entry of a fan-out snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub room_id: String,
    pub language: String,
}

/// Active subscribers of one source room, keyed by destination room id.
///
/// Each polling loop owns its own registry; there is at most one
/// subscriber per destination room.
#[derive(Debug, Default)]
pub struct SubscriberRegistry {
    subscribers: BTreeMap<String, Subscriber>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a subscriber, replacing any previous one for the same room.
    ///
    /// Returns the replaced subscriber, if any.
    pub fn register(&mut self, subscriber: Subscriber) -> Option<Subscriber> {
        self.subscribers
            .insert(subscriber.room_id.clone(), subscriber)
    }

    /// Removes the subscriber for `room_id`. Removing an absent entry is a
    /// no-op.
    pub fn unregister(&mut self, room_id: &str) -> Option<Subscriber> {
        self.subscribers.remove(room_id)
    }

    pub fn get(&self, room_id: &str) -> Option<&Subscriber> {
        self.subscribers.get(room_id)
    }

    /// Snapshot of the current subscribers, ordered by room id.
    pub fn active_subscribers(&self) -> Vec<Destination> {
        self.subscribers
            .values()
            .map(|s| Destination {
                room_id: s.room_id.clone(),
                language: s.language.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

/// Title of the room receiving translations for `author_email`.
pub fn destination_title(source_title: &str, author_email: &str) -> String {
    format!("{source_title}-{author_email}")
}

/// Finds the destination room for a subscriber, creating it on first use.
///
/// Lookup and creation are two separate calls, so two concurrent
/// resolutions of the same title can create duplicate rooms. Callers must
/// resolve destinations from a single task per source room.
pub async fn resolve_destination(
    directory: &dyn RoomDirectory,
    source_title: &str,
    author_email: &str,
) -> Result<String> {
    let title = destination_title(source_title, author_email);

    if let Some(room_id) = directory
        .find_room_id_by_title(&title)
        .await
        .with_context(|| format!("Failed to look up destination room '{title}'"))?
    {
        debug!(%title, %room_id, "Reusing destination room");
        return Ok(room_id);
    }

    let room_id = directory
        .create_room(&title)
        .await
        .with_context(|| format!("Failed to create destination room '{title}'"))?;
    info!(%title, %room_id, "Created destination room");

    Ok(room_id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn subscriber(room_id: &str, language: &str) -> Subscriber {
        Subscriber {
            room_id: room_id.to_string(),
            author_id: "person-1".to_string(),
            author_email: "alice@example.com".to_string(),
            language: language.to_string(),
        }
    }

    #[test]
    fn test_register_and_snapshot() {
        let mut registry = SubscriberRegistry::new();
        registry.register(subscriber("room-b", "ru"));
        registry.register(subscriber("room-a", "de"));

        let snapshot = registry.active_subscribers();

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].room_id, "room-a");
        assert_eq!(snapshot[0].language, "de");
        assert_eq!(snapshot[1].room_id, "room-b");
        assert_eq!(snapshot[1].language, "ru");
    }

    #[test]
    fn test_register_overwrites_same_room() {
        let mut registry = SubscriberRegistry::new();
        assert!(registry.register(subscriber("room-a", "de")).is_none());

        let previous = registry.register(subscriber("room-a", "ru"));

        assert_eq!(previous.map(|s| s.language), Some("de".to_string()));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("room-a").unwrap().language, "ru");
    }

    #[test]
    fn test_unregister() {
        let mut registry = SubscriberRegistry::new();
        registry.register(subscriber("room-a", "de"));

        assert!(registry.unregister("room-a").is_some());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unregister_absent_is_noop() {
        let mut registry = SubscriberRegistry::new();
        registry.register(subscriber("room-a", "de"));

        assert!(registry.unregister("room-z").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_snapshot_is_detached_from_registry() {
        let mut registry = SubscriberRegistry::new();
        registry.register(subscriber("room-a", "de"));

        let snapshot = registry.active_subscribers();
        registry.unregister("room-a");

        assert_eq!(snapshot.len(), 1);
        assert!(registry.active_subscribers().is_empty());
    }

    #[test]
    fn test_destination_title() {
        assert_eq!(
            destination_title("Demo Room", "alice@example.com"),
            "Demo Room-alice@example.com"
        );
    }

    #[derive(Default)]
    struct FakeDirectory {
        rooms: Mutex<Vec<(String, String)>>,
        created: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl RoomDirectory for FakeDirectory {
        async fn find_room_id_by_title(&self, title: &str) -> Result<Option<String>> {
            Ok(self
                .rooms
                .lock()
                .unwrap()
                .iter()
                .find(|(_, t)| t == title)
                .map(|(id, _)| id.clone()))
        }

        async fn create_room(&self, title: &str) -> Result<String> {
            let mut rooms = self.rooms.lock().unwrap();
            let id = format!("room-{}", rooms.len() + 1);
            rooms.push((id.clone(), title.to_string()));
            self.created.lock().unwrap().push(title.to_string());
            Ok(id)
        }
    }

    #[tokio::test]
    async fn test_resolve_destination_creates_then_reuses() {
        let directory = FakeDirectory::default();

        let first = resolve_destination(&directory, "Demo", "alice@example.com")
            .await
            .unwrap();
        let second = resolve_destination(&directory, "Demo", "alice@example.com")
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(
            *directory.created.lock().unwrap(),
            vec!["Demo-alice@example.com".to_string()]
        );
    }

    #[tokio::test]
    async fn test_resolve_destination_uses_existing_room() {
        let directory = FakeDirectory::default();
        directory
            .rooms
            .lock()
            .unwrap()
            .push(("existing".to_string(), "Demo-bob@example.com".to_string()));

        let room_id = resolve_destination(&directory, "Demo", "bob@example.com")
            .await
            .unwrap();

        assert_eq!(room_id, "existing");
        assert!(directory.created.lock().unwrap().is_empty());
    }
}
