use std::io::Write;

use anyhow::Result;
use futures::{Stream, StreamExt, pin_mut};
use llmapi::{ChatMessage, ContentPart, LlmClient, send_chat_completion, stream_chat_completion};
use tracing::debug;

use crate::config::Config;
use crate::encode::encode_image;

/// Text-to-image: generate from a prompt alone.
pub async fn text_to_image(
    config: &Config,
    prompt: &str,
    model: Option<&str>,
    stream: Option<bool>,
) -> Result<String> {
    let messages = vec![ChatMessage::user(prompt)];
    call_api(config, messages, model, stream).await
}

/// Image-to-image: transform one reference image according to the prompt.
pub async fn image_to_image(
    config: &Config,
    prompt: &str,
    image_path: &str,
    model: Option<&str>,
    stream: Option<bool>,
) -> Result<String> {
    let data_url = encode_image(image_path)?;
    let messages = vec![ChatMessage::user_parts(vec![
        ContentPart::text(prompt),
        ContentPart::image_url(data_url),
    ])];
    call_api(config, messages, model, stream).await
}

/// Multi-image fusion: combine several reference images under one prompt.
pub async fn multi_image_gen(
    config: &Config,
    prompt: &str,
    image_paths: &[String],
    model: Option<&str>,
    stream: Option<bool>,
) -> Result<String> {
    let mut parts = vec![ContentPart::text(prompt)];
    for path in image_paths {
        parts.push(ContentPart::image_url(encode_image(path)?));
    }
    let messages = vec![ChatMessage::user_parts(parts)];
    call_api(config, messages, model, stream).await
}

/// Shared remote call. Model and stream flag fall back to the configured
/// defaults when not overridden.
async fn call_api(
    config: &Config,
    messages: Vec<ChatMessage>,
    model: Option<&str>,
    stream: Option<bool>,
) -> Result<String> {
    let client = LlmClient::new(&config.api_base, &config.api_key, &config.model);
    let model = model.unwrap_or(&config.model);
    let stream = stream.unwrap_or(config.stream);
    debug!("requesting chat completion (model: {model}, stream: {stream})");

    if stream {
        let deltas = stream_chat_completion(&client, model, &messages);
        consume_stream(deltas).await
    } else {
        send_chat_completion(&client, model, &messages).await
    }
}

/// Prints fragments the moment they arrive and returns the concatenation,
/// strictly in delivery order. A trailing newline closes the streamed output.
pub async fn consume_stream(deltas: impl Stream<Item = Result<String>>) -> Result<String> {
    pin_mut!(deltas);
    let mut full_content = String::new();
    let mut stdout = std::io::stdout();

    while let Some(delta) = deltas.next().await {
        let delta = delta?;
        print!("{delta}");
        let _ = stdout.flush();
        full_content.push_str(&delta);
    }
    println!();

    Ok(full_content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    #[tokio::test]
    async fn fragments_concatenate_in_delivery_order() {
        let deltas = stream::iter(vec![
            Ok("Hello".to_string()),
            Ok(" ".to_string()),
            Ok("World".to_string()),
        ]);
        assert_eq!(consume_stream(deltas).await.unwrap(), "Hello World");
    }

    #[tokio::test]
    async fn empty_stream_yields_empty_text() {
        let deltas = stream::iter(Vec::<Result<String>>::new());
        assert_eq!(consume_stream(deltas).await.unwrap(), "");
    }

    #[tokio::test]
    async fn stream_error_propagates() {
        let deltas = stream::iter(vec![
            Ok("partial".to_string()),
            Err(anyhow::anyhow!("connection reset")),
        ]);
        assert!(consume_stream(deltas).await.is_err());
    }

    #[tokio::test]
    async fn missing_reference_image_fails_before_any_call() {
        let config = Config {
            api_base: "http://127.0.0.1:1".to_string(),
            api_key: "key".to_string(),
            model: "model".to_string(),
            output_mode: "base64".to_string(),
            stream: false,
        };
        let err = image_to_image(&config, "restyle", "/nonexistent.png", None, None)
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Image not found:"));
    }
}
