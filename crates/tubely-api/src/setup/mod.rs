//! Application setup and initialization

pub mod routes;
pub mod server;

use crate::state::AppState;
use crate::utils::staging::prepare_staging_dir;
use anyhow::{Context, Result};
use std::sync::Arc;
use tubely_core::Config;
use tubely_db::{setup_database, PostgresVideoRepository};
use tubely_processing::{FfmpegRepackager, FfprobeInspector};
use tubely_storage::{create_asset_storage, create_storage};

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry(&config.log_format)
        .context("Failed to initialize telemetry")?;
    crate::error::set_hide_error_details(config.is_production());

    tracing::info!(environment = %config.environment, "Configuration loaded and validated");

    let pool = setup_database(&config).await?;

    let assets = create_asset_storage(&config)
        .await
        .context("Failed to initialize asset directory")?;
    let video_storage = create_storage(&config)
        .await
        .context("Failed to initialize video storage")?;

    let staging_dir = config
        .upload_staging_dir
        .clone()
        .unwrap_or_else(std::env::temp_dir);
    let staging_dir = prepare_staging_dir(&staging_dir).await?;
    tracing::info!(path = %staging_dir.display(), "Upload staging directory ready");

    let inspector = FfprobeInspector::new(config.ffprobe_path.clone())?;
    let repackager = FfmpegRepackager::new(config.ffmpeg_path.clone())?;

    let state = Arc::new(AppState {
        config,
        videos: Arc::new(PostgresVideoRepository::new(pool)),
        assets,
        video_storage,
        inspector: Arc::new(inspector),
        repackager: Arc::new(repackager),
    });

    let router = routes::setup_routes(state.clone())?;

    Ok((state, router))
}
