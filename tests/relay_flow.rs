#![allow(clippy::unwrap_used)]
//! End-to-end relay tests against an in-memory chat backend.
//!
//! Each test drives polling loops one iteration at a time, so the flow is
//! deterministic and never sleeps.

use anyhow::{Result, bail};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

use babelfish::relay::demo::{DEMO_SCRIPT, demo_step};
use babelfish::relay::{
    Message, MessageSink, MessageSource, PollingLoop, RelayConfig, RoomDirectory, SourceRoom,
    TranslationRouter, Translator,
};

const BOT_EMAIL: &str = "bot@example.com";

#[derive(Default)]
struct Room {
    title: String,
    messages: Vec<Message>,
}

/// Rooms keyed by id; messages stored oldest first.
#[derive(Default)]
struct Chat {
    rooms: Mutex<BTreeMap<String, Room>>,
    next_id: Mutex<u64>,
}

impl Chat {
    fn next_id(&self, prefix: &str) -> String {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        format!("{prefix}{next}")
    }

    fn add_room(&self, title: &str) -> String {
        let id = self.next_id("room-");
        self.rooms.lock().unwrap().insert(
            id.clone(),
            Room {
                title: title.to_string(),
                messages: Vec::new(),
            },
        );
        id
    }

    fn say(&self, room_id: &str, author: &str, text: &str) {
        let id = self.next_id("msg-");
        let message = Message::new(id, text)
            .with_author(format!("person-{author}"), author)
            .in_room(room_id);
        self.rooms
            .lock()
            .unwrap()
            .get_mut(room_id)
            .unwrap()
            .messages
            .push(message);
    }

    fn texts_in(&self, title: &str) -> Vec<String> {
        let rooms = self.rooms.lock().unwrap();
        rooms
            .values()
            .find(|room| room.title == title)
            .map(|room| room.messages.iter().map(|m| m.text.clone()).collect())
            .unwrap_or_default()
    }

    fn room_count(&self) -> usize {
        self.rooms.lock().unwrap().len()
    }
}

#[async_trait]
impl MessageSource for Chat {
    async fn fetch_messages(&self, room_id: &str) -> Result<Vec<Message>> {
        let rooms = self.rooms.lock().unwrap();
        let Some(room) = rooms.get(room_id) else {
            bail!("no such room: {room_id}");
        };
        Ok(room.messages.iter().rev().cloned().collect())
    }
}

#[async_trait]
impl RoomDirectory for Chat {
    async fn find_room_id_by_title(&self, title: &str) -> Result<Option<String>> {
        let rooms = self.rooms.lock().unwrap();
        Ok(rooms
            .iter()
            .find(|(_, room)| room.title == title)
            .map(|(id, _)| id.clone()))
    }

    async fn create_room(&self, title: &str) -> Result<String> {
        Ok(self.add_room(title))
    }
}

#[async_trait]
impl MessageSink for Chat {
    async fn post_message(&self, room_id: &str, text: &str) -> Result<String> {
        self.say(room_id, BOT_EMAIL, text);
        Ok(format!("posted-{room_id}"))
    }
}

struct Tagger;

#[async_trait]
impl Translator for Tagger {
    async fn translate(&self, text: &str, language: &str) -> Result<String> {
        Ok(format!("[{language}] {text}"))
    }
}

fn polling_loop(chat: &Arc<Chat>, room_id: &str, title: &str) -> PollingLoop {
    let (_tx, rx) = watch::channel(false);
    let router = TranslationRouter::new(Arc::new(Tagger), chat.clone());
    let config = RelayConfig {
        interval: Duration::ZERO,
        max_iterations: None,
        max_retries: 0,
        backoff: Duration::ZERO,
    };
    PollingLoop::new(
        SourceRoom {
            id: room_id.to_string(),
            title: title.to_string(),
        },
        chat.clone(),
        chat.clone(),
        router,
        config,
        rx,
    )
}

#[tokio::test]
async fn test_demo_conversation_end_to_end() {
    let chat = Arc::new(Chat::default());
    let room_id = chat.add_room("Demo");
    let mut relay = polling_loop(&chat, &room_id, "Demo");
    let last_step = DEMO_SCRIPT.iter().map(|(step, _)| *step).max().unwrap();

    for step in 0..=last_step {
        for line in demo_step(step) {
            chat.post_message(&room_id, line).await.unwrap();
        }
        relay.run_iteration().await.unwrap();
    }

    assert_eq!(
        chat.texts_in("Demo-bot@example.com"),
        vec![
            "[de] Hi Bob! How's that estimate going?",
            "[de] Como esta? Habla ingles?",
            "[de] That is fantastic!",
            "[de] Parlez vous francais?",
            "[ru] Eppure si muove",
            "[ru] Como se dice butter",
        ]
    );
    // Source room plus one destination room, reused after /stop.
    assert_eq!(chat.room_count(), 2);

    let stats = relay.stats();
    assert_eq!(stats.commands_applied, 3);
    assert_eq!(stats.deliveries, 6);
    assert_eq!(stats.failures, 0);
    assert_eq!(relay.registry().len(), 1);
}

#[tokio::test]
async fn test_rooms_keep_separate_subscribers() {
    let chat = Arc::new(Chat::default());
    let sync = chat.add_room("Sync");
    let support = chat.add_room("Support");
    let mut sync_relay = polling_loop(&chat, &sync, "Sync");
    let mut support_relay = polling_loop(&chat, &support, "Support");

    chat.say(&sync, "alice@example.com", "/translate fr");
    chat.say(&support, "bob@example.com", "/translate");
    sync_relay.run_iteration().await.unwrap();
    support_relay.run_iteration().await.unwrap();

    chat.say(&sync, "carol@example.com", "standup at ten");
    chat.say(&support, "dave@example.com", "ticket closed");
    sync_relay.run_iteration().await.unwrap();
    support_relay.run_iteration().await.unwrap();

    assert_eq!(
        chat.texts_in("Sync-alice@example.com"),
        vec!["[fr] standup at ten"]
    );
    assert_eq!(
        chat.texts_in("Support-bob@example.com"),
        vec!["[de] ticket closed"]
    );
}

#[tokio::test]
async fn test_history_is_relayed_once() {
    let chat = Arc::new(Chat::default());
    let room_id = chat.add_room("Demo");
    let mut relay = polling_loop(&chat, &room_id, "Demo");

    chat.say(&room_id, "alice@example.com", "/translate es");
    chat.say(&room_id, "bob@example.com", "first");
    for _ in 0..3 {
        relay.run_iteration().await.unwrap();
    }
    chat.say(&room_id, "bob@example.com", "second");
    relay.run_iteration().await.unwrap();
    relay.run_iteration().await.unwrap();

    assert_eq!(
        chat.texts_in("Demo-alice@example.com"),
        vec!["[es] first", "[es] second"]
    );
    assert_eq!(relay.stats().iterations, 5);
}
