//! API root

use axum::{routing::get, Json, Router};
use serde::Serialize;

#[derive(Serialize)]
pub struct RootResponse {
    pub message: &'static str,
}

/// GET /api
async fn root() -> Json<RootResponse> {
    tracing::debug!("request to /api");
    Json(RootResponse { message: "success" })
}

pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/api", get(root))
}
