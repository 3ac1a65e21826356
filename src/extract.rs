use std::path::Path;

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_ENGINE;
use regex::Regex;
use tokio::fs;
use tracing::{debug, warn};

use crate::fs_utils::timestamped_file_name;
use crate::models::SavedImage;

/// Markdown image whose target is an embedded base64 data URL.
const BASE64_IMAGE_PATTERN: &str = r"!\[([^\]]*)\]\(data:image/(\w+);base64,([^)]+)\)";

/// Markdown image pointing at a remote URL. Recorded, never downloaded.
const URL_IMAGE_PATTERN: &str = r"!\[([^\]]*)\]\((https?://[^)\s]+)\)";

/// Scans response text for embedded images, persists base64 payloads under
/// `output_dir` and records remote image URLs as metadata.
///
/// Base64 records come first, then URL records, each group in the order the
/// matches appear in the text. A payload that fails to decode or write is
/// skipped with a warning; the remaining matches are still processed.
pub async fn extract_and_save_images(text: &str, output_dir: &Path) -> Result<Vec<SavedImage>> {
    let mut records = Vec::new();

    let base64_images = Regex::new(BASE64_IMAGE_PATTERN).context("invalid base64 image pattern")?;
    for captures in base64_images.captures_iter(text) {
        let alt = captures[1].to_string();
        let format = captures[2].to_string();
        // Models occasionally wrap long payloads; stray whitespace is not
        // part of the base64 alphabet.
        let payload: String = captures[3].chars().filter(|c| !c.is_whitespace()).collect();

        let bytes = match BASE64_ENGINE.decode(payload.as_bytes()) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!("skipping image '{alt}': base64 decode failed: {err}");
                continue;
            }
        };

        let target_path = output_dir.join(timestamped_file_name(&format));
        if let Err(err) = fs::write(&target_path, &bytes).await {
            warn!(
                "skipping image '{alt}': cannot write '{}': {err}",
                target_path.display()
            );
            continue;
        }
        debug!("saved {} bytes to {}", bytes.len(), target_path.display());

        records.push(SavedImage {
            location: target_path.display().to_string(),
            format,
            size_bytes: bytes.len() as u64,
            alt,
        });
    }

    let url_images = Regex::new(URL_IMAGE_PATTERN).context("invalid URL image pattern")?;
    for captures in url_images.captures_iter(text) {
        records.push(SavedImage {
            location: captures[2].to_string(),
            format: "url".to_string(),
            size_bytes: 0,
            alt: captures[1].to_string(),
        });
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn single_base64_image_is_saved_inside_the_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let records = extract_and_save_images("![a](data:image/png;base64,AAAA)", dir.path())
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.format, "png");
        assert_eq!(record.alt, "a");
        assert_eq!(record.size_bytes, 3); // "AAAA" decodes to three zero bytes
        let path = Path::new(&record.location);
        assert!(path.starts_with(dir.path()));
        assert!(path.is_file());
    }

    #[tokio::test]
    async fn base64_records_precede_url_records() {
        let dir = tempfile::tempdir().unwrap();
        let text = "intro ![remote](https://example.com/cat.png) and \
                    ![local](data:image/webp;base64,AAAA) outro";
        let records = extract_and_save_images(text, dir.path()).await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].format, "webp");
        assert_eq!(records[0].alt, "local");
        assert!(records[1].is_remote());
        assert_eq!(records[1].location, "https://example.com/cat.png");
        assert_eq!(records[1].alt, "remote");
        assert_eq!(records[1].size_bytes, 0);
    }

    #[tokio::test]
    async fn undecodable_payload_is_skipped_without_aborting() {
        let dir = tempfile::tempdir().unwrap();
        let text = "![bad](data:image/png;base64,@@@@) ![good](data:image/gif;base64,AAAA)";
        let records = extract_and_save_images(text, dir.path()).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].format, "gif");
        assert_eq!(records[0].alt, "good");
    }

    #[tokio::test]
    async fn whitespace_inside_payload_is_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let text = "![wrapped](data:image/png;base64,AA\nAA)";
        let records = extract_and_save_images(text, dir.path()).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].size_bytes, 3);
    }

    #[tokio::test]
    async fn plain_text_produces_no_records() {
        let dir = tempfile::tempdir().unwrap();
        let records = extract_and_save_images("no images here", dir.path())
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn multiple_base64_images_keep_textual_order() {
        let dir = tempfile::tempdir().unwrap();
        let text = "![first](data:image/png;base64,AAAA) ![second](data:image/jpeg;base64,BBBB)";
        let records = extract_and_save_images(text, dir.path()).await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].alt, "first");
        assert_eq!(records[1].alt, "second");
        assert_eq!(records[1].format, "jpeg");
    }
}
