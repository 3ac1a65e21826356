pub mod config;
pub mod constants;
pub mod encode;
pub mod extract;
pub mod fs_utils;
pub mod generate;
pub mod models;

pub use config::Config;
pub use models::SavedImage;
