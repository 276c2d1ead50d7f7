//! User repository
//!
//! Create and read only; users are never deleted.

use sqlx::PgPool;

use crate::models::{NewUser, User, UserId};
use super::DbError;

/// User repository
pub struct UserRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a user. A taken username surfaces as a database error.
    pub async fn create(&self, user: &NewUser) -> Result<User, DbError> {
        let created: User = sqlx::query_as(
            r#"
            INSERT INTO users (username, password, name, location)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, password, name, location, active
            "#,
        )
        .bind(&user.username)
        .bind(&user.password)
        .bind(&user.name)
        .bind(&user.location)
        .fetch_one(self.pool)
        .await?;

        tracing::debug!(user_id = %created.id, username = %created.username, "user created");
        Ok(created)
    }

    /// All users in id order.
    pub async fn list(&self) -> Result<Vec<User>, DbError> {
        let users = sqlx::query_as(
            r#"
            SELECT id, username, password, name, location, active
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(users)
    }

    pub async fn get(&self, id: UserId) -> Result<User, DbError> {
        sqlx::query_as(
            r#"
            SELECT id, username, password, name, location, active
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("user", id))
    }
}
