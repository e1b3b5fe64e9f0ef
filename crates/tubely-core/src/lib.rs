//! Tubely Core Library
//!
//! This crate provides the domain models, error types and configuration shared
//! by the storage, processing, database and API crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{AspectRatio, Video};
pub use storage_types::StorageBackend;
