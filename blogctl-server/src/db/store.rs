//! Storage trait used by the tag service
//!
//! `PgStore` is the real implementation over a `PgPool`; `MemoryStore`
//! (see `memory.rs`) backs the service and router tests.

use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::{Post, PostId, Tag, TagId, TagName, TagUpsert, User, UserId};
use super::repos::{DbError, PostRepo, TagRepo, UserRepo};

/// Store operations the tag service depends on
#[async_trait]
pub trait BlogStore: Send + Sync {
    /// Every tag, in id order.
    async fn all_tags(&self) -> Result<Vec<Tag>, DbError>;

    /// Fetch the tag named `name`, creating it if it doesn't exist yet.
    async fn get_or_create_tag(&self, name: &TagName) -> Result<TagUpsert, DbError>;

    /// Get-or-create each distinct name, in first-occurrence order.
    async fn create_tags(&self, names: &[TagName]) -> Result<Vec<Tag>, DbError> {
        let mut seen = HashSet::new();
        let mut tags = Vec::with_capacity(names.len());

        for name in names {
            if !seen.insert(name.as_str()) {
                continue;
            }
            tags.push(self.get_or_create_tag(name).await?.into_tag());
        }

        Ok(tags)
    }

    /// Link tags to a post; already-linked pairs are left alone.
    async fn add_tags_to_post(&self, post_id: PostId, tag_ids: &[TagId]) -> Result<(), DbError>;

    /// Make `tag_ids` the post's exact tag set in one atomic step: links
    /// outside the set are removed and missing ones added. On error the
    /// previous set is untouched. Returns the number of links removed.
    async fn replace_post_tags(&self, post_id: PostId, tag_ids: &[TagId]) -> Result<u64, DbError>;

    /// Hydrated posts carrying the named tag, in id order, with no visibility filter.
    async fn posts_by_tag_name(&self, tag_name: &str) -> Result<Vec<Post>, DbError>;

    async fn post_by_id(&self, id: PostId) -> Result<Post, DbError>;

    async fn user_by_id(&self, id: UserId) -> Result<User, DbError>;
}

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl BlogStore for PgStore {
    async fn all_tags(&self) -> Result<Vec<Tag>, DbError> {
        TagRepo::new(&self.pool).list().await
    }

    async fn get_or_create_tag(&self, name: &TagName) -> Result<TagUpsert, DbError> {
        TagRepo::new(&self.pool).get_or_create(name).await
    }

    async fn add_tags_to_post(&self, post_id: PostId, tag_ids: &[TagId]) -> Result<(), DbError> {
        TagRepo::new(&self.pool).link(post_id, tag_ids).await
    }

    async fn replace_post_tags(&self, post_id: PostId, tag_ids: &[TagId]) -> Result<u64, DbError> {
        TagRepo::new(&self.pool).replace(post_id, tag_ids).await
    }

    async fn posts_by_tag_name(&self, tag_name: &str) -> Result<Vec<Post>, DbError> {
        PostRepo::new(&self.pool).by_tag_name(tag_name).await
    }

    async fn post_by_id(&self, id: PostId) -> Result<Post, DbError> {
        PostRepo::new(&self.pool).get(id).await
    }

    async fn user_by_id(&self, id: UserId) -> Result<User, DbError> {
        UserRepo::new(&self.pool).get(id).await
    }
}
