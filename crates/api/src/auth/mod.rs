//! Bearer-token authentication against an external identity provider.

pub mod jwt;

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use jukebox_core::error::CoreError;

use crate::error::AppError;
use jwt::KeyStore;

const BEARER_PREFIX: &str = "Bearer ";

/// Axum middleware rejecting requests without a valid bearer token.
///
/// On success the verified [`jwt::Claims`] are attached to request
/// extensions for downstream handlers.
pub async fn require_bearer(
    State(keys): State<Arc<KeyStore>>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match extract_bearer_token(&request) {
        Ok(token) => token,
        Err(message) => {
            return AppError::Core(CoreError::Unauthorized(message.to_string())).into_response();
        }
    };

    match keys.validate(token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => {
            tracing::debug!(error = %e, "rejected bearer token");
            AppError::Core(CoreError::Unauthorized(format!("Invalid token: {e}"))).into_response()
        }
    }
}

/// Pull the token out of the `Authorization: Bearer <token>` header.
fn extract_bearer_token(request: &Request) -> Result<&str, &'static str> {
    let header = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or("missing authorization header")?;

    let token = header
        .strip_prefix(BEARER_PREFIX)
        .ok_or("invalid authorization header format")?;

    if token.is_empty() {
        return Err("empty bearer token");
    }
    Ok(token)
}
