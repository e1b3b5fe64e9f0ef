use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::fetch_owned_video;
use crate::state::AppState;
use crate::utils::upload::{media_type_essence, random_file_name, thumbnail_extension};
use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    Json,
};
use std::sync::Arc;
use tubely_core::constants::{THUMBNAIL_DIR, THUMBNAIL_FIELD};
use tubely_core::{AppError, Video};
use uuid::Uuid;

#[utoipa::path(
    post,
    path = "/api/thumbnail_upload/{video_id}",
    tag = "uploads",
    params(("video_id" = Uuid, Path, description = "Video ID")),
    request_body(content = inline(Object), content_type = "multipart/form-data",
        description = "Form field `thumbnail`: a JPEG or PNG image"),
    responses(
        (status = 200, description = "Thumbnail stored", body = Video),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller does not own the video", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, multipart), fields(user_id = %user.user_id))]
pub async fn upload_thumbnail(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(video_id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Video>, HttpAppError> {
    let video_id = Uuid::parse_str(&video_id)?;

    // Reject non-owners before anything is written
    fetch_owned_video(&state, video_id, &user).await?;

    let mut multipart = multipart?;
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(THUMBNAIL_FIELD) {
            continue;
        }
        let essence = media_type_essence(field.content_type())?;
        let extension = thumbnail_extension(&essence)?;
        let data = field.bytes().await?;
        upload = Some((essence, extension, data));
        break;
    }
    let (content_type, extension, data) =
        upload.ok_or_else(|| AppError::BadRequest("Unable to parse form file".to_string()))?;

    let key = format!("{}/{}.{}", THUMBNAIL_DIR, random_file_name(), extension);
    let thumbnail_url = state
        .assets
        .upload_with_key(&key, data.to_vec(), &content_type)
        .await?;

    // The record may have changed hands while the body was read
    let mut video = fetch_owned_video(&state, video_id, &user).await?;
    video.set_thumbnail_url(thumbnail_url);
    state.videos.update_thumbnail_url(&video).await?;

    tracing::info!(
        video_id = %video_id,
        key = %key,
        size_bytes = data.len() as u64,
        "Thumbnail uploaded"
    );

    Ok(Json(video))
}
