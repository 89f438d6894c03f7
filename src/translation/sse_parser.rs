//! Server-Sent Events (SSE) parser for OpenAI-compatible streaming responses.

use anyhow::Result;
use bytes::Bytes;
use futures_util::Stream;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct StreamResponse {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    error: Option<StreamError>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: Delta,
}

#[derive(Debug, Deserialize)]
struct Delta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamError {
    message: String,
}

/// A single parsed SSE line.
#[derive(Debug, PartialEq, Eq)]
enum SseEvent {
    /// A chunk of translated text.
    Content(String),
    /// The backend reported an error mid-stream.
    Error(String),
    /// The `[DONE]` terminator.
    Done,
    /// Comments, keep-alives, role-only deltas and unparseable lines.
    Skip,
}

/// Converts a raw SSE byte stream into a stream of text chunks.
///
/// Stops at the `[DONE]` marker. An error event from the backend is yielded
/// as an `Err` and ends the stream.
pub fn sse_to_text_stream(
    byte_stream: impl Stream<Item = reqwest::Result<Bytes>> + Send + 'static,
) -> impl Stream<Item = Result<String>> + Send {
    async_stream::stream! {
        use futures_util::StreamExt;

        let mut byte_stream = std::pin::pin!(byte_stream);
        let mut buffer = String::new();

        while let Some(chunk_result) = byte_stream.next().await {
            let chunk = match chunk_result {
                Ok(c) => c,
                Err(e) => {
                    yield Err(anyhow::anyhow!("Stream error: {e}"));
                    return;
                }
            };

            buffer.push_str(&String::from_utf8_lossy(&chunk));

            while let Some(line_end) = buffer.find('\n') {
                let line: String = buffer.drain(..=line_end).collect();

                match parse_sse_line(line.trim()) {
                    SseEvent::Content(content) => yield Ok(content),
                    SseEvent::Error(message) => {
                        yield Err(anyhow::anyhow!("Translation backend error: {message}"));
                        return;
                    }
                    SseEvent::Done => return,
                    SseEvent::Skip => {}
                }
            }
        }
    }
}

fn parse_sse_line(line: &str) -> SseEvent {
    let Some(json_str) = line.strip_prefix("data:").map(str::trim_start) else {
        return SseEvent::Skip;
    };

    if json_str == "[DONE]" {
        return SseEvent::Done;
    }

    let Ok(response) = serde_json::from_str::<StreamResponse>(json_str) else {
        return SseEvent::Skip;
    };

    if let Some(error) = response.error {
        return SseEvent::Error(error.message);
    }

    let content: String = response
        .choices
        .into_iter()
        .filter_map(|c| c.delta.content)
        .collect();

    if content.is_empty() {
        SseEvent::Skip
    } else {
        SseEvent::Content(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(text: &str) -> SseEvent {
        SseEvent::Content(text.to_string())
    }

    #[test]
    fn test_parse_sse_line_with_content() {
        let line = r#"data: {"choices":[{"delta":{"content":"Hallo"}}]}"#;
        assert_eq!(parse_sse_line(line), content("Hallo"));
    }

    #[test]
    fn test_parse_sse_line_without_space_after_colon() {
        let line = r#"data:{"choices":[{"delta":{"content":"Hallo"}}]}"#;
        assert_eq!(parse_sse_line(line), content("Hallo"));
    }

    #[test]
    fn test_parse_sse_line_role_only_delta() {
        let line = r#"data: {"choices":[{"delta":{"role":"assistant"}}]}"#;
        assert_eq!(parse_sse_line(line), SseEvent::Skip);
    }

    #[test]
    fn test_parse_sse_line_multiple_choices() {
        let line =
            r#"data: {"choices":[{"delta":{"content":"Guten"}},{"delta":{"content":" Tag"}}]}"#;
        assert_eq!(parse_sse_line(line), content("Guten Tag"));
    }

    #[test]
    fn test_parse_sse_line_done_marker() {
        assert_eq!(parse_sse_line("data: [DONE]"), SseEvent::Done);
    }

    #[test]
    fn test_parse_sse_line_error_event() {
        let line = r#"data: {"error":{"message":"model not found","type":"invalid_request_error"}}"#;
        assert_eq!(
            parse_sse_line(line),
            SseEvent::Error("model not found".to_string())
        );
    }

    #[test]
    fn test_parse_sse_line_ignored_lines() {
        assert_eq!(parse_sse_line(""), SseEvent::Skip);
        assert_eq!(parse_sse_line(": keep-alive"), SseEvent::Skip);
        assert_eq!(parse_sse_line("event: message"), SseEvent::Skip);
        assert_eq!(parse_sse_line("data: not json"), SseEvent::Skip);
    }

    #[test]
    fn test_parse_sse_line_unicode_content() {
        let line = r#"data: {"choices":[{"delta":{"content":"Привет"}}]}"#;
        assert_eq!(parse_sse_line(line), content("Привет"));
    }
}
