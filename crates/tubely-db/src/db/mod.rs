//! Database repositories for data access layer
//
// Video records
pub mod video;
//
// Pool and migrations
pub mod pool;

pub use pool::setup_database;
pub use video::{PostgresVideoRepository, VideoRepository};
