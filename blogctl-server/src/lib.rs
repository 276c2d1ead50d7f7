//! blogctl-server: HTTP API for a small blog
//!
//! Users write posts, posts carry tags, and `GET /api/tags/{tag}/posts`
//! lists the posts behind a tag that the requesting user is allowed to see.

pub mod db;
pub mod http;
pub mod models;
pub mod service;

pub use db::{BlogStore, DbError, MemoryStore, PgStore};
pub use http::{run_server, ServerConfig};
pub use service::TagService;
