//! Application state shared by all handlers.

use std::sync::Arc;
use tubely_core::Config;
use tubely_db::VideoRepository;
use tubely_processing::{MediaInspector, MediaRepackager};
use tubely_storage::Storage;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub videos: Arc<dyn VideoRepository>,
    /// Local asset root that thumbnails are written to.
    pub assets: Arc<dyn Storage>,
    /// Destination of processed videos (S3 or local).
    pub video_storage: Arc<dyn Storage>,
    pub inspector: Arc<dyn MediaInspector>,
    pub repackager: Arc<dyn MediaRepackager>,
}
