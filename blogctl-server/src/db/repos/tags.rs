//! Tag repository
//!
//! - get_or_create: INSERT ... ON CONFLICT DO NOTHING, then SELECT on a miss
//! - link: idempotent per (post_id, tag_id), one transaction per call
//! - replace: delete and insert in the same transaction

use sqlx::{PgConnection, PgPool};

use crate::models::{PostId, Tag, TagId, TagName, TagUpsert};
use super::DbError;

/// Tag repository
pub struct TagRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> TagRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All tags in id order.
    pub async fn list(&self) -> Result<Vec<Tag>, DbError> {
        let tags = sqlx::query_as("SELECT id, name FROM tags ORDER BY id")
            .fetch_all(self.pool)
            .await?;

        Ok(tags)
    }

    /// Return the tag with this name, creating it if needed.
    ///
    /// The unique constraint on `tags.name` arbitrates concurrent creators:
    /// the loser's insert does nothing and it reads back the winner's row.
    pub async fn get_or_create(&self, name: &TagName) -> Result<TagUpsert, DbError> {
        let inserted: Option<Tag> = sqlx::query_as(
            r#"
            INSERT INTO tags (name) VALUES ($1)
            ON CONFLICT (name) DO NOTHING
            RETURNING id, name
            "#,
        )
        .bind(name.as_str())
        .fetch_optional(self.pool)
        .await?;

        if let Some(tag) = inserted {
            tracing::debug!(tag_id = %tag.id, name = %tag.name, "tag created");
            return Ok(TagUpsert::Created(tag));
        }

        let existing: Tag = sqlx::query_as("SELECT id, name FROM tags WHERE name = $1")
            .bind(name.as_str())
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("tag", name))?;

        Ok(TagUpsert::AlreadyExists(existing))
    }

    /// Attach tags to a post. Pairs that are already linked are skipped.
    pub async fn link(&self, post_id: PostId, tag_ids: &[TagId]) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        ensure_post(&mut *tx, post_id).await?;
        let inserted = insert_links(&mut *tx, post_id, tag_ids).await?;

        tx.commit().await?;
        tracing::debug!(post_id = %post_id, requested = tag_ids.len(), inserted, "tags linked");
        Ok(())
    }

    /// Make `tag_ids` the post's exact tag set. Returns the number of links removed.
    ///
    /// The delete and the inserts share one transaction: if any insert
    /// fails, the previous tag set is left as it was.
    pub async fn replace(&self, post_id: PostId, tag_ids: &[TagId]) -> Result<u64, DbError> {
        let mut tx = self.pool.begin().await?;

        ensure_post(&mut *tx, post_id).await?;

        let keep: Vec<i32> = tag_ids.iter().map(|id| id.0).collect();
        let removed = sqlx::query(
            r#"
            DELETE FROM post_tags
            WHERE post_id = $1 AND NOT (tag_id = ANY($2))
            "#,
        )
        .bind(post_id)
        .bind(&keep)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let inserted = insert_links(&mut *tx, post_id, tag_ids).await?;

        tx.commit().await?;
        tracing::debug!(post_id = %post_id, removed, inserted, "tags replaced");
        Ok(removed)
    }

    /// Number of links for a post.
    pub async fn link_count(&self, post_id: PostId) -> Result<i64, DbError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM post_tags WHERE post_id = $1")
            .bind(post_id)
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }
}

async fn ensure_post(conn: &mut PgConnection, post_id: PostId) -> Result<(), DbError> {
    let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM posts WHERE id = $1)")
        .bind(post_id)
        .fetch_one(&mut *conn)
        .await?;

    if !exists {
        return Err(DbError::not_found("post", post_id));
    }
    Ok(())
}

/// Insert (post, tag) pairs, skipping existing ones. Returns rows inserted.
async fn insert_links(
    conn: &mut PgConnection,
    post_id: PostId,
    tag_ids: &[TagId],
) -> Result<u64, DbError> {
    let mut inserted = 0u64;
    for tag_id in tag_ids {
        inserted += sqlx::query(
            r#"
            INSERT INTO post_tags (post_id, tag_id)
            VALUES ($1, $2)
            ON CONFLICT (post_id, tag_id) DO NOTHING
            "#,
        )
        .bind(post_id)
        .bind(*tag_id)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    }
    Ok(inserted)
}
