use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::fetch_owned_video;
use crate::state::AppState;
use crate::utils::staging::{stage_field, ScopedPath};
use crate::utils::upload::{media_type_essence, random_hex_id};
use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    Json,
};
use std::sync::Arc;
use tubely_core::constants::{VIDEO_CONTENT_TYPE, VIDEO_FIELD};
use tubely_core::{AppError, AspectRatio};
use uuid::Uuid;

/// Upload a video file for an existing video record.
///
/// The file is staged to a temp file, probed for its aspect ratio, rewritten
/// for progressive playback and stored under `<aspect>/<random>.mp4`. The
/// record's `video_url` is updated only after the object has been stored.
#[utoipa::path(
    post,
    path = "/api/video_upload/{video_id}",
    tag = "uploads",
    params(("video_id" = Uuid, Path, description = "Video ID")),
    request_body(content = inline(Object), content_type = "multipart/form-data",
        description = "Form field `video`: an MP4 file"),
    responses(
        (status = 200, description = "Video stored; body is the video ID", body = Uuid),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller does not own the video", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Processing or storage failure", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, multipart), fields(user_id = %user.user_id))]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(video_id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Uuid>, HttpAppError> {
    let video_id = Uuid::parse_str(&video_id)?;
    let mut video = fetch_owned_video(&state, video_id, &user).await?;

    let staging_dir = state
        .config
        .upload_staging_dir
        .clone()
        .unwrap_or_else(std::env::temp_dir);

    let mut multipart = multipart?;
    let mut staged = None;
    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(VIDEO_FIELD) {
            continue;
        }
        let essence = media_type_essence(field.content_type())?;
        if essence != VIDEO_CONTENT_TYPE {
            return Err(AppError::BadRequest(format!(
                "Invalid file type. Allowed types: {}",
                VIDEO_CONTENT_TYPE
            ))
            .into());
        }
        staged = Some(stage_field(&mut field, &staging_dir).await?);
        break;
    }
    let (staged, size) =
        staged.ok_or_else(|| AppError::BadRequest("Unable to parse form file".to_string()))?;

    let aspect = match state.inspector.aspect_ratio(staged.path()).await {
        Ok(aspect) => aspect,
        Err(e) => {
            tracing::warn!(
                video_id = %video_id,
                error = %e,
                "Couldn't determine aspect ratio, storing under other/"
            );
            AspectRatio::Other
        }
    };

    let processed = state
        .repackager
        .faststart(staged.path())
        .await
        .map_err(|e| AppError::MediaProcessing(format!("{:#}", e)))?;
    let processed = ScopedPath::new(processed);

    let key = aspect.storage_key(&random_hex_id());
    let video_url = state
        .video_storage
        .upload_file(&key, processed.path(), VIDEO_CONTENT_TYPE)
        .await?;

    video.set_video_url(video_url);
    state.videos.update_video_url(&video).await?;

    tracing::info!(
        video_id = %video_id,
        key = %key,
        aspect = %aspect,
        size_bytes = size,
        "Video uploaded"
    );

    Ok(Json(video_id))
}
