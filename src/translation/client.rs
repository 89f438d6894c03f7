use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use reqwest::Client;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::borrow::Cow;
use std::pin::Pin;

use super::language::language_name;
use super::prompt::{SYSTEM_PROMPT_TEMPLATE, build_system_prompt};
use super::sse_parser::sse_to_text_stream;
use crate::relay::Translator;

#[derive(Debug, Clone)]
pub struct TranslationRequest {
    pub source_text: String,
    pub target_language: String,
    pub model: String,
    pub endpoint: String,
}

impl TranslationRequest {
    /// Compute cache key for this request
    pub fn cache_key(&self) -> String {
        let cache_input = serde_json::json!({
            "source_text": self.source_text,
            "target_language": self.target_language,
            "model": self.model,
            "endpoint": self.endpoint,
            "prompt_hash": Self::prompt_hash()
        });

        let mut hasher = Sha256::new();
        hasher.update(cache_input.to_string().as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Compute hash of the system prompt template
    pub fn prompt_hash() -> String {
        let mut hasher = Sha256::new();
        hasher.update(SYSTEM_PROMPT_TEMPLATE.as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: Cow<'a, str>,
}

/// Client for an OpenAI-compatible chat completions endpoint.
pub struct TranslationClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

impl TranslationClient {
    pub fn new(endpoint: String, api_key: Option<String>, model: String) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            api_key,
            model,
        }
    }

    /// Builds the request for translating `text` into `language`.
    pub fn request(&self, text: &str, language: &str) -> TranslationRequest {
        TranslationRequest {
            source_text: text.to_string(),
            target_language: language.to_string(),
            model: self.model.clone(),
            endpoint: self.endpoint.clone(),
        }
    }

    pub async fn translate_stream(
        &self,
        request: &TranslationRequest,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<String>> + Send>>> {
        let url = format!(
            "{}/v1/chat/completions",
            self.endpoint.trim_end_matches('/')
        );

        // Spell out known codes so the model is not left guessing ("zh-TW", "fil")
        let language =
            language_name(&request.target_language).unwrap_or(request.target_language.as_str());
        let system_prompt = build_system_prompt(language);

        let chat_request = ChatCompletionRequest {
            model: &request.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: Cow::Owned(system_prompt),
                },
                ChatMessage {
                    role: "user",
                    content: Cow::Borrowed(&request.source_text),
                },
            ],
            stream: true,
        };

        let mut http_request = self.client.post(&url).json(&chat_request);

        if let Some(api_key) = &self.api_key {
            http_request = http_request.bearer_auth(api_key);
        }

        let response = http_request
            .send()
            .await
            .with_context(|| format!("Failed to connect to API endpoint: {url}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("API request failed with status {status}: {body}");
        }

        Ok(Box::pin(sse_to_text_stream(response.bytes_stream())))
    }

    /// Translates a request and returns the complete text.
    pub async fn translate_request(&self, request: &TranslationRequest) -> Result<String> {
        let mut stream = self.translate_stream(request).await?;
        let mut translated = String::new();

        while let Some(chunk) = stream.next().await {
            translated.push_str(&chunk?);
        }

        let translated = translated.trim().to_string();
        if translated.is_empty() && !request.source_text.trim().is_empty() {
            bail!("API returned an empty translation");
        }

        Ok(translated)
    }
}

#[async_trait]
impl Translator for TranslationClient {
    async fn translate(&self, text: &str, language: &str) -> Result<String> {
        self.translate_request(&self.request(text, language)).await
    }
}
