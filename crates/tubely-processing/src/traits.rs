//! Core traits for media processing
//!
//! The upload pipeline talks to the external tools only through these traits.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tubely_core::AspectRatio;

/// Frame size of the first video stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamDimensions {
    pub width: i64,
    pub height: i64,
}

impl StreamDimensions {
    pub fn aspect_ratio(&self) -> AspectRatio {
        AspectRatio::classify(self.width, self.height)
    }
}

/// Media inspector trait - reads stream information from a file on disk
#[async_trait]
pub trait MediaInspector: Send + Sync {
    /// Dimensions of the first video stream, or `None` when the file has no
    /// video stream.
    async fn probe_dimensions(&self, path: &Path) -> anyhow::Result<Option<StreamDimensions>>;

    /// Classify the file's aspect ratio. A file without a video stream is
    /// `Other`.
    async fn aspect_ratio(&self, path: &Path) -> anyhow::Result<AspectRatio> {
        Ok(self
            .probe_dimensions(path)
            .await?
            .map(|d| d.aspect_ratio())
            .unwrap_or(AspectRatio::Other))
    }
}

/// Media repackager trait - rewrites a container without re-encoding
#[async_trait]
pub trait MediaRepackager: Send + Sync {
    /// Write a copy of `input` with the index moved to the front of the file
    /// and return the path of the copy. The caller owns the returned file.
    async fn faststart(&self, input: &Path) -> anyhow::Result<PathBuf>;
}
