pub mod api;
pub mod models;
pub mod types;

pub use api::{delta_from_sse_line, send_chat_completion, stream_chat_completion};
pub use types::{ChatMessage, ContentPart, ImageUrl, LlmClient, MessageContent};
