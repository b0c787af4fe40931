//! Screenshot artifact output.

use crate::driver::PNG_SIGNATURE;
use crate::result::{VerifyError, VerifyResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A screenshot persisted to disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenshotArtifact {
    /// Where the file was written
    pub path: PathBuf,
    /// File size in bytes
    pub size_bytes: usize,
}

/// Write PNG data to `path`, creating parent directories and replacing any
/// existing file.
pub async fn write_screenshot(path: &Path, data: &[u8]) -> VerifyResult<ScreenshotArtifact> {
    if !data.starts_with(&PNG_SIGNATURE) {
        return Err(VerifyError::ScreenshotError {
            message: format!("captured {} bytes that are not a PNG image", data.len()),
        });
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, data).await?;

    tracing::info!(path = %path.display(), bytes = data.len(), "screenshot written");
    Ok(ScreenshotArtifact {
        path: path.to_path_buf(),
        size_bytes: data.len(),
    })
}
