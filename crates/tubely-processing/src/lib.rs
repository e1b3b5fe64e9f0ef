//! Tubely media processing
//!
//! Wrappers around the external `ffprobe` and `ffmpeg` binaries, exposed
//! through the [`MediaInspector`] and [`MediaRepackager`] traits so the upload
//! handlers can be exercised without the tools installed.

pub mod traits;
pub mod validator;
pub mod video;

pub use traits::{MediaInspector, MediaRepackager, StreamDimensions};
pub use video::{FfmpegRepackager, FfprobeInspector};
