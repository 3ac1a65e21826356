pub const DEFAULT_API_BASE: &str = "https://nano.shunleite.com/v1";
pub const DEFAULT_API_KEY: &str = "default-key";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_OUTPUT_MODE: &str = "base64";
pub const OUTPUT_DIR_NAME: &str = "image-gen-skill";
pub const SAVED_IMAGE_PREFIX: &str = "image";
