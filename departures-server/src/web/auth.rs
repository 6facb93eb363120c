//! Bearer-token authentication against stored installations.

use axum::http::{HeaderMap, header};

use crate::store::Installation;

use super::routes::AppError;
use super::state::AppState;

/// Pull the token out of an `Authorization: Bearer <token>` header.
///
/// Anything else (no header, non-UTF-8 bytes, another scheme, an empty
/// token) yields `None`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Resolve the request's bearer token to an installation.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Installation, AppError> {
    let token = bearer_token(headers).ok_or_else(|| AppError::Unauthorized {
        message: "token is missing".to_string(),
    })?;

    state
        .store
        .find_by_access_token(token)
        .await?
        .ok_or_else(|| AppError::Unauthorized {
            message: "token is invalid".to_string(),
        })
}
