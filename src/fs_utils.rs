use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use rand::Rng;
use tokio::fs;

use crate::constants::{OUTPUT_DIR_NAME, SAVED_IMAGE_PREFIX};

/// Resolves the directory generated images are written to and creates it if
/// absent. An explicit override (from `--output-dir` or `IMAGE_OUTPUT_DIR`)
/// wins; otherwise a fixed subdirectory of the system temp dir is used.
pub async fn resolve_output_dir(override_dir: Option<&Path>) -> Result<PathBuf> {
    let path = match override_dir {
        Some(dir) => dir.to_path_buf(),
        None => std::env::temp_dir().join(OUTPUT_DIR_NAME),
    };

    fs::create_dir_all(&path)
        .await
        .with_context(|| format!("Unable to create output directory '{}'", path.display()))?;

    Ok(path)
}

/// File name for a saved image: `image_<YYYYMMDD_HHMMSS>_<8 hex>.<format>`.
/// The random suffix keeps images saved within the same second apart.
pub fn timestamped_file_name(format: &str) -> String {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let suffix: u32 = rand::rng().random();
    format!("{SAVED_IMAGE_PREFIX}_{stamp}_{suffix:08x}.{format}")
}
