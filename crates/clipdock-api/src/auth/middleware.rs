use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

use clipdock_core::AppError;

use crate::error::HttpAppError;
use crate::state::AppState;

use super::jwt::verify_token;

/// Authenticated caller, inserted into request extensions by
/// [`require_auth`] and extracted by handlers.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Uuid);

/// Bearer-token middleware for the protected routes.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, HttpAppError> {
    let token = bearer_token(&request).ok_or_else(|| {
        AppError::Unauthorized("Missing or malformed authorization header".to_string())
    })?;
    let user_id = verify_token(token, &state.config.jwt_secret)?;
    request.extensions_mut().insert(CurrentUser(user_id));
    Ok(next.run(request).await)
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

// Extension-based extraction keeps the handler signatures flat and works
// alongside body-consuming extractors like Multipart.
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .copied()
            .ok_or_else(|| {
                HttpAppError(AppError::Unauthorized(
                    "Authentication required".to_string(),
                ))
            })
    }
}
