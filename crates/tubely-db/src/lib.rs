//! Database repositories for the upload service.

pub mod db;

pub use db::{setup_database, PostgresVideoRepository, VideoRepository};
