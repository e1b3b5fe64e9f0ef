use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Width/height tolerance, in pixels, when matching a 16:9 or 9:16 frame.
const ASPECT_TOLERANCE: i64 = 1;

/// Coarse aspect bucket of a video, used only to pick the storage key prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectRatio {
    /// 16:9
    Landscape,
    /// 9:16
    Portrait,
    Other,
}

impl AspectRatio {
    /// Classify a frame size.
    ///
    /// Non-positive dimensions and square frames are `Other`. A frame is
    /// landscape when `height * 16 / 9` is within one pixel of `width`, and
    /// portrait when `height * 9 / 16` is within one pixel of `width`.
    pub fn classify(width: i64, height: i64) -> Self {
        if width <= 0 || height <= 0 {
            return AspectRatio::Other;
        }

        // Scaled in i128 so no frame size can overflow
        let (w, h) = (i128::from(width), i128::from(height));
        let tolerance = i128::from(ASPECT_TOLERANCE);

        if height > width {
            let scaled = h * 9 / 16;
            if (scaled - w).abs() <= tolerance {
                return AspectRatio::Portrait;
            }
        } else if width > height {
            let scaled = h * 16 / 9;
            if (scaled - w).abs() <= tolerance {
                return AspectRatio::Landscape;
            }
        }

        AspectRatio::Other
    }

    /// Directory prefix used in object storage keys.
    pub fn key_prefix(&self) -> &'static str {
        match self {
            AspectRatio::Landscape => "landscape",
            AspectRatio::Portrait => "portrait",
            AspectRatio::Other => "other",
        }
    }

    /// Build `<prefix>/<name>.mp4`.
    pub fn storage_key(&self, name: &str) -> String {
        format!("{}/{}.mp4", self.key_prefix(), name)
    }
}

impl Display for AspectRatio {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.key_prefix())
    }
}
