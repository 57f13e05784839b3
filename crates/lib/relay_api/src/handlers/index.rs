//! API index.

use axum::Json;
use relay_core::models::ApiIndex;

/// `GET /` — describes the available endpoints.
pub async fn index_handler() -> Json<ApiIndex> {
    Json(ApiIndex {
        name: "chat-relay".into(),
        version: relay_core::version().to_string(),
        endpoints: crate::endpoint_infos(),
    })
}
