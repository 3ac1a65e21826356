use std::env;

use crate::constants::{DEFAULT_API_BASE, DEFAULT_API_KEY, DEFAULT_IMAGE_MODEL, DEFAULT_OUTPUT_MODE};

/// Process-wide settings snapshot, read once from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    /// Preferred payload shape for generated images: `url` or `base64`.
    pub output_mode: String,
    pub stream: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            api_base: env::var("IMAGE_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            api_key: env::var("IMAGE_API_KEY").unwrap_or_else(|_| DEFAULT_API_KEY.to_string()),
            model: env::var("IMAGE_MODEL").unwrap_or_else(|_| DEFAULT_IMAGE_MODEL.to_string()),
            output_mode: env::var("IMAGE_OUTPUT_MODE")
                .unwrap_or_else(|_| DEFAULT_OUTPUT_MODE.to_string()),
            stream: env::var("IMAGE_STREAM")
                .map(|value| value.to_lowercase() == "true")
                .unwrap_or(true),
        }
    }

    /// API key shortened for display.
    pub fn redacted_key(&self) -> String {
        if self.api_key.chars().count() > 8 {
            let prefix: String = self.api_key.chars().take(8).collect();
            format!("{prefix}...")
        } else {
            "***".to_string()
        }
    }

    pub fn print(&self) {
        println!("=== Image Generation Config ===");
        println!("  api_base: {}", self.api_base);
        println!("  api_key: {}", self.redacted_key());
        println!("  model: {}", self.model);
        println!("  output_mode: {}", self.output_mode);
        println!("  stream: {}", self.stream);
        println!("{}", "=".repeat(32));
    }
}
