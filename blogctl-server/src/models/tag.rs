//! Tags and the get-or-create result

use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::ValidationError;

/// Matches the `VARCHAR(255)` column on `tags.name`
const MAX_TAG_NAME_LEN: usize = 255;

/// Primary key of the `tags` table
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct TagId(pub i32);

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A tag as stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}

/// Tag name accepted for creation.
///
/// Lookups by name take a plain `&str`: an unknown or malformed name simply
/// matches nothing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TagName(String);

impl TagName {
    /// Create a tag name.
    ///
    /// # Rules
    /// - Non-empty after trimming whitespace
    /// - At most 255 characters
    ///
    /// # Example
    /// ```
    /// use blogctl_server::models::TagName;
    ///
    /// assert_eq!(TagName::new(" #happy ").unwrap().as_str(), "#happy");
    /// assert!(TagName::new("   ").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "tag name" });
        }

        if trimmed.chars().count() > MAX_TAG_NAME_LEN {
            return Err(ValidationError::TooLong {
                field: "tag name",
                max: MAX_TAG_NAME_LEN,
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TagName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TagName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of a get-or-create on `tags.name`.
///
/// A concurrent creator that loses the race on the unique constraint gets
/// `AlreadyExists` with the winner's row, never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagUpsert {
    Created(Tag),
    AlreadyExists(Tag),
}

impl TagUpsert {
    pub fn tag(&self) -> &Tag {
        match self {
            Self::Created(tag) | Self::AlreadyExists(tag) => tag,
        }
    }

    pub fn into_tag(self) -> Tag {
        match self {
            Self::Created(tag) | Self::AlreadyExists(tag) => tag,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}
