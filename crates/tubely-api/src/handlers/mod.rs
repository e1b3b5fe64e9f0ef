pub mod health;
pub mod thumbnail_upload;
pub mod video_upload;

use crate::auth::{ensure_owner, AuthUser};
use crate::state::AppState;
use tubely_core::{AppError, Video};
use uuid::Uuid;

/// Load a video and check that `user` owns it.
pub(crate) async fn fetch_owned_video(
    state: &AppState,
    video_id: Uuid,
    user: &AuthUser,
) -> Result<Video, AppError> {
    let video = state
        .videos
        .get_video(video_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Couldn't find video".to_string()))?;
    ensure_owner(&video, user)?;
    Ok(video)
}
