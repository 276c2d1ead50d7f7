//! In-process store for tests and local experiments
//!
//! Mirrors the PostgreSQL semantics the service relies on: unique tag
//! names, unique (post, tag) links, id-ordered results, and NotFound on
//! missing posts and users. `set_failing(true)` makes every trait call fail
//! the way an unreachable database would.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::models::{
    NewPost, NewUser, Post, PostAuthor, PostId, PostUpdate, Tag, TagId, TagName, TagUpsert, User,
    UserId,
};
use super::repos::DbError;
use super::store::BlogStore;

#[derive(Debug, Clone)]
struct StoredPost {
    author_id: UserId,
    title: String,
    content: String,
    active: bool,
}

#[derive(Debug, Default)]
struct Inner {
    users: BTreeMap<UserId, User>,
    posts: BTreeMap<PostId, StoredPost>,
    tags: BTreeMap<TagId, Tag>,
    links: BTreeSet<(PostId, TagId)>,
    failing: bool,
}

impl Inner {
    fn check(&self) -> Result<(), DbError> {
        if self.failing {
            return Err(DbError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    /// NotFound unless the post and every tag exist.
    fn check_link_targets(&self, post_id: PostId, tag_ids: &[TagId]) -> Result<(), DbError> {
        if !self.posts.contains_key(&post_id) {
            return Err(DbError::not_found("post", post_id));
        }
        if let Some(missing) = tag_ids.iter().find(|id| !self.tags.contains_key(*id)) {
            return Err(DbError::not_found("tag", missing));
        }
        Ok(())
    }

    fn hydrate(&self, id: PostId) -> Result<Post, DbError> {
        let stored = self
            .posts
            .get(&id)
            .ok_or_else(|| DbError::not_found("post", id))?;
        let author = self
            .users
            .get(&stored.author_id)
            .ok_or_else(|| DbError::not_found("user", stored.author_id))?;

        let tags = self
            .links
            .range((id, TagId(i32::MIN))..=(id, TagId(i32::MAX)))
            .filter_map(|(_, tag_id)| self.tags.get(tag_id).cloned())
            .collect();

        Ok(Post {
            id,
            title: stored.title.clone(),
            content: stored.content.clone(),
            active: stored.active,
            author: PostAuthor::from(author),
            tags,
        })
    }
}

/// Mutex-guarded maps standing in for the four tables
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every subsequent store call fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.lock().failing = failing;
    }

    /// Insert an active user.
    pub fn insert_user(&self, user: NewUser) -> User {
        let mut inner = self.lock();
        let id = UserId(inner.users.keys().next_back().map_or(1, |id| id.0 + 1));
        let user = User {
            id,
            username: user.username,
            password: user.password,
            name: user.name,
            location: user.location,
            active: true,
        };
        inner.users.insert(id, user.clone());
        user
    }

    /// Insert an active, untagged post. Fails if the author doesn't exist.
    pub fn insert_post(&self, post: NewPost) -> Result<PostId, DbError> {
        let mut inner = self.lock();
        if !inner.users.contains_key(&post.author_id) {
            return Err(DbError::not_found("user", post.author_id));
        }

        let id = PostId(inner.posts.keys().next_back().map_or(1, |id| id.0 + 1));
        inner.posts.insert(
            id,
            StoredPost {
                author_id: post.author_id,
                title: post.title,
                content: post.content,
                active: true,
            },
        );
        Ok(id)
    }

    pub fn update_post(&self, id: PostId, update: PostUpdate) -> Result<(), DbError> {
        let mut inner = self.lock();
        let stored = inner
            .posts
            .get_mut(&id)
            .ok_or_else(|| DbError::not_found("post", id))?;

        if let Some(title) = update.title {
            stored.title = title;
        }
        if let Some(content) = update.content {
            stored.content = content;
        }
        if let Some(active) = update.active {
            stored.active = active;
        }
        Ok(())
    }

    /// Number of (post, tag) links recorded for a post.
    pub fn link_count(&self, post_id: PostId) -> usize {
        self.lock()
            .links
            .iter()
            .filter(|(post, _)| *post == post_id)
            .count()
    }
}

#[async_trait]
impl BlogStore for MemoryStore {
    async fn all_tags(&self) -> Result<Vec<Tag>, DbError> {
        let inner = self.lock();
        inner.check()?;
        Ok(inner.tags.values().cloned().collect())
    }

    async fn get_or_create_tag(&self, name: &TagName) -> Result<TagUpsert, DbError> {
        let mut inner = self.lock();
        inner.check()?;

        if let Some(tag) = inner.tags.values().find(|t| t.name == name.as_str()) {
            return Ok(TagUpsert::AlreadyExists(tag.clone()));
        }

        let id = TagId(inner.tags.keys().next_back().map_or(1, |id| id.0 + 1));
        let tag = Tag {
            id,
            name: name.as_str().to_owned(),
        };
        inner.tags.insert(id, tag.clone());
        Ok(TagUpsert::Created(tag))
    }

    async fn add_tags_to_post(&self, post_id: PostId, tag_ids: &[TagId]) -> Result<(), DbError> {
        let mut inner = self.lock();
        inner.check()?;
        inner.check_link_targets(post_id, tag_ids)?;

        inner.links.extend(tag_ids.iter().map(|tag_id| (post_id, *tag_id)));
        Ok(())
    }

    async fn replace_post_tags(&self, post_id: PostId, tag_ids: &[TagId]) -> Result<u64, DbError> {
        let mut inner = self.lock();
        inner.check()?;
        // Validate everything before the first mutation so a failure leaves the old set
        inner.check_link_targets(post_id, tag_ids)?;

        let before = inner.links.len();
        inner
            .links
            .retain(|(post, tag)| *post != post_id || tag_ids.contains(tag));
        let removed = (before - inner.links.len()) as u64;

        inner.links.extend(tag_ids.iter().map(|tag_id| (post_id, *tag_id)));
        Ok(removed)
    }

    async fn posts_by_tag_name(&self, tag_name: &str) -> Result<Vec<Post>, DbError> {
        let inner = self.lock();
        inner.check()?;

        let Some(tag_id) = inner
            .tags
            .values()
            .find(|t| t.name == tag_name)
            .map(|t| t.id)
        else {
            return Ok(Vec::new());
        };

        inner
            .posts
            .keys()
            .filter(|post_id| inner.links.contains(&(**post_id, tag_id)))
            .map(|post_id| inner.hydrate(*post_id))
            .collect()
    }

    async fn post_by_id(&self, id: PostId) -> Result<Post, DbError> {
        let inner = self.lock();
        inner.check()?;
        inner.hydrate(id)
    }

    async fn user_by_id(&self, id: UserId) -> Result<User, DbError> {
        let inner = self.lock();
        inner.check()?;
        inner
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| DbError::not_found("user", id))
    }
}
