//! Request guards for the `/api` namespace.

use axum::{
    Json,
    extract::Request,
    http::{StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use common::response::ApiResponse;

/// Requires `Authorization: Bearer <API_KEY>` on every request.
///
/// When no key is configured the guard is disabled; development setups run
/// both services without one.
pub async fn require_api_key(req: Request, next: Next) -> Response {
    let expected = util::config::api_key();
    if expected.is_empty() {
        return next.run(req).await;
    }

    let supplied = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    match supplied {
        Some(value) if value == format!("Bearer {expected}") => next.run(req).await,
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::<()>::error("Invalid or missing API key")),
        )
            .into_response(),
    }
}
