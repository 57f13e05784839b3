//! Structured 404 for unmatched routes.

use axum::Json;
use axum::http::{Method, StatusCode, Uri};
use relay_core::models::NotFoundResponse;
use tracing::debug;

use crate::ENDPOINTS;

/// Fallback for any route (or method) the router does not serve.
pub async fn not_found_handler(method: Method, uri: Uri) -> (StatusCode, Json<NotFoundResponse>) {
    debug!(%method, path = uri.path(), "no route");
    (
        StatusCode::NOT_FOUND,
        Json(NotFoundResponse {
            error: "Endpoint not found".into(),
            path: uri.path().to_string(),
            method: method.to_string(),
            available_endpoints: ENDPOINTS
                .iter()
                .map(|(method, path, _)| format!("{method} {path}"))
                .collect(),
        }),
    )
}
