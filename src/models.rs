/// Metadata for one image discovered in a response.
#[derive(Debug, Clone)]
pub struct SavedImage {
    /// Local file path for saved payloads, remote URL for link-only matches.
    pub location: String,
    /// File extension for saved payloads, `"url"` for link-only matches.
    pub format: String,
    /// Decoded payload size. Zero for link-only matches.
    pub size_bytes: u64,
    pub alt: String,
}

impl SavedImage {
    pub fn is_remote(&self) -> bool {
        self.format == "url"
    }
}
