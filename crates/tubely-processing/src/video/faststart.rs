//! Container rewriting through ffmpeg

use crate::traits::MediaRepackager;
use crate::validator::{validate_input_file, validate_tool_path};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

const OUTPUT_SUFFIX: &str = ".processing";

/// `<input>.processing`
pub fn output_path(input: &Path) -> PathBuf {
    let mut name = OsString::from(input.as_os_str());
    name.push(OUTPUT_SUFFIX);
    PathBuf::from(name)
}

/// Moves the MP4 `moov` atom to the front of the file (`-movflags faststart`)
/// so playback can start before the whole file has downloaded. Streams are
/// copied, never re-encoded.
pub struct FfmpegRepackager {
    ffmpeg_path: String,
}

impl FfmpegRepackager {
    pub fn new(ffmpeg_path: String) -> Result<Self> {
        validate_tool_path("ffmpeg", &ffmpeg_path)?;
        Ok(Self { ffmpeg_path })
    }
}

#[async_trait]
impl MediaRepackager for FfmpegRepackager {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffmpeg",
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = "faststart"
    ))]
    async fn faststart(&self, input: &Path) -> Result<PathBuf> {
        let start = std::time::Instant::now();
        let validated_input = validate_input_file(input).context("Invalid video path")?;
        let output = output_path(input);

        let result = Command::new(&self.ffmpeg_path)
            .arg("-y")
            .arg("-i")
            .arg(&validated_input)
            .args(["-c", "copy", "-movflags", "faststart", "-f", "mp4"])
            .arg(&output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .context("Failed to execute ffmpeg")?;

        if !result.status.success() {
            // ffmpeg may leave a truncated file behind
            let _ = tokio::fs::remove_file(&output).await;
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(anyhow!("FFmpeg faststart failed: {}", stderr.trim()));
        }

        tracing::info!(
            duration_ms = start.elapsed().as_millis() as u64,
            output = %output.display(),
            "Faststart rewrite completed"
        );

        Ok(output)
    }
}
