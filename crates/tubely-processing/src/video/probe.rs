//! Stream inspection through ffprobe

use crate::traits::{MediaInspector, StreamDimensions};
use crate::validator::{validate_input_file, validate_tool_path};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<i64>,
    height: Option<i64>,
}

/// Parse ffprobe's `-print_format json -show_streams` output.
fn parse_probe_output(stdout: &[u8]) -> Result<Option<StreamDimensions>> {
    let probe: ProbeOutput =
        serde_json::from_slice(stdout).context("Failed to parse ffprobe output")?;

    Ok(probe
        .streams
        .into_iter()
        .next()
        .and_then(|s| match (s.width, s.height) {
            (Some(width), Some(height)) => Some(StreamDimensions { width, height }),
            _ => None,
        }))
}

pub struct FfprobeInspector {
    ffprobe_path: String,
}

impl FfprobeInspector {
    pub fn new(ffprobe_path: String) -> Result<Self> {
        validate_tool_path("ffprobe", &ffprobe_path)?;
        Ok(Self { ffprobe_path })
    }
}

#[async_trait]
impl MediaInspector for FfprobeInspector {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe"
    ))]
    async fn probe_dimensions(&self, path: &Path) -> Result<Option<StreamDimensions>> {
        let start = std::time::Instant::now();
        let validated_path = validate_input_file(path).context("Invalid video path")?;

        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_streams",
                "-select_streams",
                "v:0",
            ])
            .arg(&validated_path)
            .stdin(Stdio::null())
            .output()
            .await
            .context("Failed to execute ffprobe")?;

        if !output.status.success() {
            return Err(anyhow!(
                "ffprobe failed: {}",
                String::from_utf8_lossy(&output.stderr)
            ));
        }

        let dimensions = parse_probe_output(&output.stdout)?;

        tracing::info!(
            duration_ms = start.elapsed().as_millis() as u64,
            width = dimensions.map(|d| d.width),
            height = dimensions.map(|d| d.height),
            "Video probe completed"
        );

        Ok(dimensions)
    }
}
