//! Post repository
//!
//! Every read returns fully hydrated posts: one query for the post rows
//! joined with their author, one for the tags of all returned posts.

use std::collections::HashMap;

use sqlx::{FromRow, PgPool, Row};

use crate::models::{NewPost, Post, PostAuthor, PostId, PostUpdate, Tag, UserId};
use super::DbError;

/// Columns selected for a post joined with `users u`
const POST_COLUMNS: &str = r#"
    p.id, p.title, p.content, p.active,
    u.id AS author_id,
    u.username AS author_username,
    u.name AS author_name,
    u.location AS author_location
"#;

/// Post row before tags are attached
#[derive(Debug, FromRow)]
struct PostRow {
    id: PostId,
    title: String,
    content: String,
    active: bool,
    author_id: UserId,
    author_username: String,
    author_name: String,
    author_location: String,
}

impl PostRow {
    fn into_post(self, tags: Vec<Tag>) -> Post {
        Post {
            id: self.id,
            title: self.title,
            content: self.content,
            active: self.active,
            author: PostAuthor {
                id: self.author_id,
                username: self.author_username,
                name: self.author_name,
                location: self.author_location,
            },
            tags,
        }
    }
}

/// Post repository
pub struct PostRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> PostRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a post (active, untagged) and return it hydrated.
    pub async fn create(&self, post: &NewPost) -> Result<Post, DbError> {
        let (id,): (PostId,) = sqlx::query_as(
            r#"
            INSERT INTO posts (author_id, title, content)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(post.author_id)
        .bind(&post.title)
        .bind(&post.content)
        .fetch_one(self.pool)
        .await?;

        tracing::debug!(post_id = %id, author_id = %post.author_id, "post created");
        self.get(id).await
    }

    /// All posts in id order.
    pub async fn list(&self) -> Result<Vec<Post>, DbError> {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM posts p JOIN users u ON u.id = p.author_id ORDER BY p.id"
        );
        let rows: Vec<PostRow> = sqlx::query_as(&sql).fetch_all(self.pool).await?;

        self.hydrate(rows).await
    }

    /// Posts written by one user, in id order.
    pub async fn list_by_author(&self, author_id: UserId) -> Result<Vec<Post>, DbError> {
        let sql = format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts p
            JOIN users u ON u.id = p.author_id
            WHERE p.author_id = $1
            ORDER BY p.id
            "#
        );
        let rows: Vec<PostRow> = sqlx::query_as(&sql)
            .bind(author_id)
            .fetch_all(self.pool)
            .await?;

        self.hydrate(rows).await
    }

    pub async fn get(&self, id: PostId) -> Result<Post, DbError> {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM posts p JOIN users u ON u.id = p.author_id WHERE p.id = $1"
        );
        let row: PostRow = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("post", id))?;

        let mut posts = self.hydrate(vec![row]).await?;
        posts.pop().ok_or_else(|| DbError::not_found("post", id))
    }

    /// Every post carrying the tag named `tag_name`, regardless of
    /// visibility, in id order. An unknown name matches nothing.
    pub async fn by_tag_name(&self, tag_name: &str) -> Result<Vec<Post>, DbError> {
        let sql = format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts p
            JOIN post_tags pt ON pt.post_id = p.id
            JOIN tags t ON t.id = pt.tag_id
            JOIN users u ON u.id = p.author_id
            WHERE t.name = $1
            ORDER BY p.id
            "#
        );
        let rows: Vec<PostRow> = sqlx::query_as(&sql)
            .bind(tag_name)
            .fetch_all(self.pool)
            .await?;

        self.hydrate(rows).await
    }

    /// Apply a partial update and return the hydrated post.
    pub async fn update(&self, id: PostId, update: &PostUpdate) -> Result<Post, DbError> {
        if !update.is_empty() {
            sqlx::query(
                r#"
                UPDATE posts
                SET title = COALESCE($2, title),
                    content = COALESCE($3, content),
                    active = COALESCE($4, active)
                WHERE id = $1
                RETURNING id
                "#,
            )
            .bind(id)
            .bind(update.title.as_deref())
            .bind(update.content.as_deref())
            .bind(update.active)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("post", id))?;

            tracing::debug!(post_id = %id, "post updated");
        }

        self.get(id).await
    }

    /// Attach tags to post rows with a single query over all ids.
    async fn hydrate(&self, rows: Vec<PostRow>) -> Result<Vec<Post>, DbError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = rows.iter().map(|r| r.id.0).collect();
        let tag_rows = sqlx::query(
            r#"
            SELECT pt.post_id, t.id, t.name
            FROM post_tags pt
            JOIN tags t ON t.id = pt.tag_id
            WHERE pt.post_id = ANY($1)
            ORDER BY t.id
            "#,
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut tags_by_post: HashMap<PostId, Vec<Tag>> = HashMap::new();
        for r in tag_rows {
            tags_by_post
                .entry(r.get("post_id"))
                .or_default()
                .push(Tag {
                    id: r.get("id"),
                    name: r.get("name"),
                });
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let tags = tags_by_post.remove(&row.id).unwrap_or_default();
                row.into_post(tags)
            })
            .collect())
    }
}
