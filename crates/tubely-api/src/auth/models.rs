use crate::error::HttpAppError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tubely_core::{AppError, Video};
use uuid::Uuid;

/// Authenticated caller, inserted into request extensions by
/// [`auth_middleware`](super::auth_middleware).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Uuid,
}

// Read from extensions directly so it composes with Multipart
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .copied()
            .ok_or_else(|| {
                HttpAppError(AppError::Unauthorized(
                    "Missing authentication context".to_string(),
                ))
            })
    }
}

/// Only the owner of a video may change it.
pub fn ensure_owner(video: &Video, user: &AuthUser) -> Result<(), AppError> {
    if video.is_owned_by(user.user_id) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Not authorized to update this video".to_string(),
        ))
    }
}
