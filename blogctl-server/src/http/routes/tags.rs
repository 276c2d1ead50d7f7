//! Tag endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    middleware::{self, Next},
    response::Response,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::http::error::ApiError;
use crate::http::extractors::Viewer;
use crate::http::server::AppState;
use crate::models::{Post, Tag};
use crate::service::TagService;

/// Tag list response
#[derive(Serialize)]
pub struct TagsResponse {
    pub tags: Vec<Tag>,
}

/// Tagged posts response
#[derive(Serialize)]
pub struct PostsResponse {
    pub posts: Vec<Post>,
}

/// GET /api/tags - list all tags
async fn list_tags(State(state): State<Arc<AppState>>) -> Result<Json<TagsResponse>, ApiError> {
    let tags = TagService::new(state.store.as_ref()).all_tags().await?;
    Ok(Json(TagsResponse { tags }))
}

/// GET /api/tags/{tag_name}/posts - posts carrying the tag that the viewer may see
async fn posts_for_tag(
    State(state): State<Arc<AppState>>,
    Path(tag_name): Path<String>,
    Viewer(viewer): Viewer,
) -> Result<Json<PostsResponse>, ApiError> {
    let posts = TagService::new(state.store.as_ref())
        .resolve_posts_for_tag(&tag_name, viewer.as_ref())
        .await?;

    Ok(Json(PostsResponse { posts }))
}

async fn log_tags_request(req: Request, next: Next) -> Response {
    tracing::debug!(method = %req.method(), path = %req.uri().path(), "request to /tags");
    next.run(req).await
}

/// Tag routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/tags", get(list_tags))
        .route("/api/tags/{tag_name}/posts", get(posts_for_tag))
        .layer(middleware::from_fn(log_tags_request))
}
