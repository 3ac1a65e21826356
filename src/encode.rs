use std::path::Path;

use anyhow::{Context, Result, anyhow};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_ENGINE;

/// Fixed extension lookup. Anything unrecognized is treated as PNG.
pub fn mime_for_extension(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "image/png",
    }
}

/// Reads an image file and encodes it as a `data:<mime>;base64,<payload>` URL.
pub fn encode_image(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(anyhow!("Image not found: {}", path.display()));
    }

    let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");
    let mime_type = mime_for_extension(extension);

    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read image file: {}", path.display()))?;

    Ok(format!(
        "data:{mime_type};base64,{}",
        BASE64_ENGINE.encode(bytes)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn known_extensions_map_to_their_mime_types() {
        assert_eq!(mime_for_extension("png"), "image/png");
        assert_eq!(mime_for_extension("jpg"), "image/jpeg");
        assert_eq!(mime_for_extension("jpeg"), "image/jpeg");
        assert_eq!(mime_for_extension("gif"), "image/gif");
        assert_eq!(mime_for_extension("webp"), "image/webp");
        assert_eq!(mime_for_extension("JPG"), "image/jpeg");
    }

    #[test]
    fn unknown_extensions_fall_back_to_png() {
        assert_eq!(mime_for_extension("bmp"), "image/png");
        assert_eq!(mime_for_extension("tiff"), "image/png");
        assert_eq!(mime_for_extension(""), "image/png");
    }

    #[test]
    fn encoding_round_trips_original_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pixel.webp");
        let original: Vec<u8> = (0..=255).collect();
        fs::write(&path, &original).unwrap();

        let data_url = encode_image(&path).unwrap();
        let payload = data_url
            .strip_prefix("data:image/webp;base64,")
            .expect("data URL should carry the webp MIME type");
        let decoded = BASE64_ENGINE.decode(payload).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn missing_file_reports_image_not_found() {
        let err = encode_image("/nonexistent/photo.png").unwrap_err();
        assert!(err.to_string().starts_with("Image not found:"));
    }
}
