use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;

use crate::core::error::Error;
use crate::core::state::AppState;

pub(crate) const ADMIN_SESSION_HEADER: &str = "x-admin-session";
pub(crate) const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Token from `Authorization: Bearer <token>`, scheme matched case-insensitively.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let mut parts = value.split_whitespace();

    let (scheme, token) = (parts.next()?, parts.next()?);

    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

pub(crate) fn admin_token(headers: &HeaderMap) -> Option<&str> {
    [ADMIN_SESSION_HEADER, ADMIN_TOKEN_HEADER]
        .iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|value| value.to_str().ok())
        .map(str::trim)
        .find(|value| !value.is_empty())
}

pub(crate) async fn authorize(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Error> {
    let token = bearer_token(request.headers())
        .ok_or(Error::Unauthorized("Authorization token required"))?
        .to_owned();

    let user = state.session_controller.verify_user_session(&token).await?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

pub(crate) async fn authorize_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Error> {
    let token = admin_token(request.headers())
        .ok_or(Error::Unauthorized("Admin session token required"))?
        .to_owned();

    let admin = state.session_controller.verify_admin_session(&token).await?;

    request.extensions_mut().insert(admin);

    Ok(next.run(request).await)
}
