//! Tubely Storage Library
//!
//! Storage abstraction plus the two backends used by the upload service:
//! S3 (through `object_store`) for processed videos and the local filesystem
//! for thumbnails and development setups.
//!
//! # Storage key format
//!
//! Keys are relative paths such as `landscape/<hex>.mp4` or
//! `thumbnails/<name>.png`. Keys must not contain `..` or a leading `/`.

pub mod factory;
pub mod local;
pub mod s3;
pub mod traits;

pub use factory::{create_asset_storage, create_storage};
pub use local::LocalStorage;
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
pub use tubely_core::StorageBackend;
