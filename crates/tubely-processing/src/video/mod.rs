//! Video processing module

pub mod faststart;
pub mod probe;

pub use faststart::FfmpegRepackager;
pub use probe::FfprobeInspector;
