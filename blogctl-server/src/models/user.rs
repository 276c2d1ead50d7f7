//! User records

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::ValidationError;

/// Primary key of the `users` table
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct UserId(pub i32);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = ValidationError;

    /// Parse a user id as sent in the `x-user-id` header.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "user id" });
        }

        match s.parse::<i32>() {
            Ok(id) if id > 0 => Ok(Self(id)),
            _ => Err(ValidationError::InvalidFormat {
                field: "user id",
                reason: "must be a positive integer",
            }),
        }
    }
}

/// A registered user.
///
/// The credential is loaded with the row but never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub name: String,
    pub location: String,
    pub active: bool,
}

/// Insert payload for a user
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub name: String,
    pub location: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positive_ids() {
        assert_eq!("7".parse::<UserId>().unwrap(), UserId(7));
        assert_eq!(" 12 ".parse::<UserId>().unwrap(), UserId(12));
    }

    #[test]
    fn rejects_bad_ids() {
        assert!(matches!(
            "".parse::<UserId>(),
            Err(ValidationError::Empty { .. })
        ));
        assert!(matches!(
            "abc".parse::<UserId>(),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            "0".parse::<UserId>(),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            "-3".parse::<UserId>(),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn password_is_not_serialized() {
        let user = User {
            id: UserId(1),
            username: "dennis".into(),
            password: "chillinlikeavillain".into(),
            name: "Dennis C. Castro".into(),
            location: "San Francisco, CA".into(),
            active: true,
        };

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["username"], "dennis");
        assert!(json.get("password").is_none());
    }
}
