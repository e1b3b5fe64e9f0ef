//! Scratch files used while a video upload is processed.

use anyhow::Context;
use axum::extract::multipart::Field;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tubely_core::AppError;

use crate::error::HttpAppError;

const STAGING_PREFIX: &str = "tubely-upload";
const STAGING_SUFFIX: &str = ".mp4";

/// Removes the file at its path when dropped.
#[derive(Debug)]
pub struct ScopedPath(PathBuf);

impl ScopedPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for ScopedPath {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.0) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %self.0.display(), error = %e, "Failed to remove scratch file");
            }
        }
    }
}

/// Create `dir` if needed and check that staged files under it will pass
/// the path checks applied before ffprobe and ffmpeg run.
pub async fn prepare_staging_dir(dir: &Path) -> anyhow::Result<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create staging directory {}", dir.display()))?;

    let canonical = tokio::fs::canonicalize(dir)
        .await
        .with_context(|| format!("Staging directory not accessible: {}", dir.display()))?;

    for path in [dir, canonical.as_path()] {
        tubely_processing::validator::validate_path(&path.to_string_lossy())
            .context("Unusable upload staging directory")?;
    }

    Ok(canonical)
}

/// Stream a multipart field into a new temp file under `staging_dir` and
/// flush it to disk. The file is deleted when the returned handle drops.
pub async fn stage_field(
    field: &mut Field<'_>,
    staging_dir: &Path,
) -> Result<(NamedTempFile, u64), HttpAppError> {
    let temp = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .suffix(STAGING_SUFFIX)
        .tempfile_in(staging_dir)
        .map_err(|e| AppError::Internal(format!("Couldn't create temp file: {}", e)))?;

    let mut file = tokio::fs::File::from_std(temp.reopen()?);
    let mut size: u64 = 0;

    while let Some(chunk) = field.chunk().await? {
        size += chunk.len() as u64;
        file.write_all(&chunk).await?;
    }

    file.flush().await?;
    file.sync_all().await?;

    tracing::debug!(path = %temp.path().display(), size_bytes = size, "Upload staged");

    Ok((temp, size))
}
