use anyhow::{Context, Result, anyhow};
use async_stream::try_stream;
use futures::{Stream, StreamExt};
use reqwest::Client;
use serde_json::json;

use crate::models::{ChatCompletionChunk, ChatCompletionResponse};
use crate::types::{ChatMessage, LlmClient};

fn completions_url(client: &LlmClient) -> String {
    format!(
        "{}/chat/completions",
        client.endpoint().trim_end_matches('/')
    )
}

/// Sends a chat completion and returns the full response text in one piece.
pub async fn send_chat_completion(
    client: &LlmClient,
    model: &str,
    messages: &[ChatMessage],
) -> Result<String> {
    let payload = json!({
        "model": model,
        "messages": messages,
        "stream": false,
    });

    let http_client = Client::new();
    let response_text = http_client
        .post(completions_url(client))
        .bearer_auth(client.api_key())
        .header("Content-Type", "application/json")
        .json(&payload)
        .send()
        .await
        .context("chat completion request failed")?
        .error_for_status()
        .context("API returned non-success status")?
        .text()
        .await
        .context("failed to read response body")?;

    let response: ChatCompletionResponse = serde_json::from_str(&response_text)
        .with_context(|| format!("failed to decode response JSON: {response_text}"))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| anyhow!("no content in API response"))
}

/// Sends a chat completion with `stream: true` and yields text deltas in
/// delivery order. The stream ends at the `[DONE]` sentinel or when the
/// connection closes.
pub fn stream_chat_completion(
    client: &LlmClient,
    model: &str,
    messages: &[ChatMessage],
) -> impl Stream<Item = Result<String>> {
    let url = completions_url(client);
    let api_key = client.api_key().to_string();
    let payload = json!({
        "model": model,
        "messages": messages,
        "stream": true,
    });

    try_stream! {
        let http_client = Client::new();
        let response = http_client
            .post(url)
            .bearer_auth(api_key)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .context("chat completion request failed")?
            .error_for_status()
            .context("API returned non-success status")?;

        let mut bytes = response.bytes_stream();
        let mut buffer = String::new();

        'read: while let Some(chunk) = bytes.next().await {
            let chunk = chunk.context("error while reading response stream")?;
            buffer.push_str(&String::from_utf8_lossy(&chunk));

            // SSE events are newline-delimited; a partial line stays buffered
            // until the rest of it arrives.
            while let Some(line_end) = buffer.find('\n') {
                let line = buffer[..line_end].trim().to_string();
                buffer = buffer[line_end + 1..].to_string();

                if line == "data: [DONE]" {
                    break 'read;
                }
                if let Some(delta) = delta_from_sse_line(&line) {
                    yield delta;
                }
            }
        }
    }
}

/// Extracts the text delta carried by a single SSE line, if any.
///
/// Lines without a `data: ` prefix, the `[DONE]` sentinel, undecodable
/// payloads and role-only chunks all yield `None`.
pub fn delta_from_sse_line(line: &str) -> Option<String> {
    let data = line.strip_prefix("data: ")?;
    if data == "[DONE]" {
        return None;
    }
    let chunk: ChatCompletionChunk = serde_json::from_str(data).ok()?;
    chunk
        .choices
        .into_iter()
        .next()?
        .delta
        .content
        .filter(|content| !content.is_empty())
}
