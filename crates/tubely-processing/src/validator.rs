//! Argument validation for external tool invocations

use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

const DANGEROUS_CHARS: [char; 11] = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];

/// Validate that a path doesn't contain shell metacharacters or dangerous sequences
pub fn validate_path(path: &str) -> Result<()> {
    if path.chars().any(|c| DANGEROUS_CHARS.contains(&c)) {
        return Err(anyhow!("Path contains dangerous characters: {}", path));
    }

    if path.contains("..") {
        return Err(anyhow!("Path contains directory traversal: {}", path));
    }

    Ok(())
}

/// Validate a configured tool path such as `ffprobe` or `/usr/bin/ffmpeg`.
pub fn validate_tool_path(tool: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(anyhow!("Invalid {} path: empty", tool));
    }

    validate_path(path).with_context(|| format!("Invalid {} path", tool))?;

    if !path.chars().all(|c| {
        c.is_alphanumeric() || c == '/' || c == '-' || c == '_' || c == '.' || c == '\\'
    }) {
        return Err(anyhow!("Invalid {} path: contains unsafe characters", tool));
    }

    Ok(())
}

/// Validate an input file path and make sure it exists.
pub fn validate_input_file(path: &Path) -> Result<PathBuf> {
    validate_path(&path.to_string_lossy())?;

    path.canonicalize()
        .with_context(|| format!("Input file not accessible: {}", path.display()))
}
