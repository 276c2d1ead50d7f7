//! Repository implementations for database access
//!
//! Each repository follows these patterns:
//! - Hydrates post lists with two queries (rows, then tags), never one per post
//! - Handles uniqueness via ON CONFLICT (no check-then-insert)
//! - Uses transactions for multi-row writes

pub mod posts;
pub mod tags;
pub mod users;

pub use posts::PostRepo;
pub use tags::TagRepo;
pub use users::UserRepo;

/// Storage error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },
}

impl DbError {
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
