//! Authentication middleware
//!
//! Credential verification happens exactly once, here, before any core
//! logic. Handlers downstream read the resolved `AuthUser` extension; role
//! gates are separate layers stacked on the marketer and admin routers.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

use ltrk_common::auth::{resolve_token, AuthUser};
use ltrk_common::db::models::Role;
use ltrk_common::Error;

use crate::api::ApiError;
use crate::AppState;

/// Resolve the bearer credential and attach the identity to the request
///
/// Returns 401 when the header is missing, malformed, unknown, or expired.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| Error::Unauthorized("missing credential".into()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| Error::Unauthorized("malformed authorization header".into()))?;

    let user = resolve_token(&state.db, token).await?;
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Gate: authenticated identity must be an admin
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    require_role(&request, Role::Admin)?;
    Ok(next.run(request).await)
}

/// Gate: authenticated identity must be a marketer
pub async fn require_marketer(request: Request, next: Next) -> Result<Response, ApiError> {
    require_role(&request, Role::Marketer)?;
    Ok(next.run(request).await)
}

fn require_role(request: &Request, role: Role) -> Result<(), ApiError> {
    match request.extensions().get::<AuthUser>() {
        Some(user) if user.role == role => Ok(()),
        Some(_) => Err(Error::Forbidden(format!("{} access required", role.as_str())).into()),
        // The authenticate layer runs first; a missing extension means a
        // route was wired outside it
        None => Err(Error::Unauthorized("missing credential".into()).into()),
    }
}
