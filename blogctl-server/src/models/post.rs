//! Posts, hydrated with their author and tags

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Tag, User, UserId};

/// Primary key of the `posts` table
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct PostId(pub i32);

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Public view of a post's author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostAuthor {
    pub id: UserId,
    pub username: String,
    pub name: String,
    pub location: String,
}

impl From<&User> for PostAuthor {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            name: user.name.clone(),
            location: user.location.clone(),
        }
    }
}

/// Fully hydrated post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub active: bool,
    pub author: PostAuthor,
    pub tags: Vec<Tag>,
}

impl Post {
    pub fn author_id(&self) -> UserId {
        self.author.id
    }
}

/// Insert payload for a post
#[derive(Debug, Clone, Deserialize)]
pub struct NewPost {
    pub author_id: UserId,
    pub title: String,
    pub content: String,
}

/// Partial update; `None` leaves the column untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub active: Option<bool>,
}

impl PostUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.active.is_none()
    }
}
