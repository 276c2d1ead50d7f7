//! Custom Axum extractors

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::error::ApiError;
use super::server::AppState;
use crate::models::{User, UserId, ValidationError};
use crate::service::TagService;

/// Header naming the requesting user
pub const VIEWER_HEADER: &str = "x-user-id";

/// The requesting user, if any.
///
/// No header means an anonymous viewer. An id that matches no user is also
/// treated as anonymous; a header that isn't a positive integer is a 400.
pub struct Viewer(pub Option<User>);

impl FromRequestParts<Arc<AppState>> for Viewer {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Some(raw) = parts.headers.get(VIEWER_HEADER) else {
            return Ok(Self(None));
        };

        let id: UserId = raw
            .to_str()
            .map_err(|_| {
                ApiError::Validation(ValidationError::InvalidFormat {
                    field: "user id",
                    reason: "header must be visible ASCII",
                })
            })?
            .parse()?;

        let viewer = TagService::new(state.store.as_ref())
            .resolve_viewer(Some(id))
            .await?;
        Ok(Self(viewer))
    }
}
