use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::relay::{Message, MessageSink, MessageSource, RoomDirectory};

/// Default Spark (Webex) REST endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://webexapis.com/v1";

/// A Spark room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Deserialize)]
struct ItemList<T> {
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct Created {
    id: String,
}

#[derive(Debug, Serialize)]
struct CreateRoom<'a> {
    title: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PostMessage<'a> {
    room_id: &'a str,
    text: &'a str,
}

/// Bot client for the Spark REST API.
pub struct SparkClient {
    client: Client,
    endpoint: String,
    token: String,
}

impl SparkClient {
    pub fn new(endpoint: String, token: String) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.endpoint.trim_end_matches('/'))
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response> {
        let response = request
            .bearer_auth(&self.token)
            .send()
            .await
            .with_context(|| format!("Failed to connect to Spark while trying to {what}"))?;

        check_status(response)
            .await
            .with_context(|| format!("Failed to {what}"))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T> {
        self.send(request, what)
            .await?
            .json::<T>()
            .await
            .with_context(|| format!("Unexpected Spark response while trying to {what}"))
    }

    /// Lists the rooms the bot belongs to.
    pub async fn list_rooms(&self) -> Result<Vec<Room>> {
        let list: ItemList<Room> = self
            .send_json(self.client.get(self.url("rooms")), "list rooms")
            .await?;
        Ok(list.items)
    }

    /// Returns the id of the first room titled `title`. Titles are not
    /// unique, so later duplicates are ignored.
    pub async fn find_room_id_by_title(&self, title: &str) -> Result<Option<String>> {
        let rooms = self.list_rooms().await?;
        Ok(first_room_titled(&rooms, title).map(|room| room.id.clone()))
    }

    pub async fn create_room(&self, title: &str) -> Result<String> {
        let created: Created = self
            .send_json(
                self.client.post(self.url("rooms")).json(&CreateRoom { title }),
                "create room",
            )
            .await?;
        debug!(%title, room_id = %created.id, "Created room");
        Ok(created.id)
    }

    pub async fn delete_room(&self, room_id: &str) -> Result<()> {
        self.send(
            self.client.delete(self.url(&format!("rooms/{room_id}"))),
            "delete room",
        )
        .await?;
        debug!(%room_id, "Deleted room");
        Ok(())
    }

    /// Returns the messages of a room, newest first.
    pub async fn list_messages(&self, room_id: &str) -> Result<Vec<Message>> {
        let url = Url::parse_with_params(&self.url("messages"), &[("roomId", room_id)])
            .context("Invalid Spark endpoint")?;
        let list: ItemList<Message> = self
            .send_json(self.client.get(url), "list messages")
            .await?;
        Ok(list.items)
    }

    /// Posts plain text into a room and returns the new message id.
    pub async fn post_message(&self, room_id: &str, text: &str) -> Result<String> {
        let created: Created = self
            .send_json(
                self.client
                    .post(self.url("messages"))
                    .json(&PostMessage { room_id, text }),
                "post message",
            )
            .await?;
        Ok(created.id)
    }
}

#[async_trait]
impl MessageSource for SparkClient {
    async fn fetch_messages(&self, room_id: &str) -> Result<Vec<Message>> {
        self.list_messages(room_id).await
    }
}

#[async_trait]
impl RoomDirectory for SparkClient {
    async fn find_room_id_by_title(&self, title: &str) -> Result<Option<String>> {
        Self::find_room_id_by_title(self, title).await
    }

    async fn create_room(&self, title: &str) -> Result<String> {
        Self::create_room(self, title).await
    }
}

#[async_trait]
impl MessageSink for SparkClient {
    async fn post_message(&self, room_id: &str, text: &str) -> Result<String> {
        Self::post_message(self, room_id, text).await
    }
}

fn first_room_titled<'a>(rooms: &'a [Room], title: &str) -> Option<&'a Room> {
    rooms.iter().find(|room| room.title == title)
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    bail!("Spark request failed with status {status}: {body}");
}
