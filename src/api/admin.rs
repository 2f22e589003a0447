//! Routes behind the bearer-token guard.

use axum::Json;

use super::error::JsonResponse;

/// Confirms the caller holds a valid access token.
pub(super) async fn session() -> Json<JsonResponse> {
    Json(JsonResponse::ok("authorized"))
}
