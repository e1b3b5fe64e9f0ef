use crate::auth::jwt::{extract_bearer_token, validate_access_token};
use crate::auth::models::AuthUser;
use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// Resolve the caller from the bearer token and attach an [`AuthUser`].
/// Missing or invalid credentials stop the request with 401.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let user_id = match extract_bearer_token(request.headers())
        .and_then(|token| validate_access_token(token, &state.config.jwt_secret))
    {
        Ok(user_id) => user_id,
        Err(e) => return HttpAppError(e).into_response(),
    };

    tracing::debug!(user_id = %user_id, "Request authenticated");
    request.extensions_mut().insert(AuthUser { user_id });
    next.run(request).await
}
