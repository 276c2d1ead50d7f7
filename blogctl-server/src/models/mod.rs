//! Domain models shared by the store, service, and HTTP layers
//!
//! Identifiers are typed wrappers over the `SERIAL` keys so a post id can't
//! be passed where a tag id is expected. Tag names are validated at
//! construction; everything else is taken as stored.

pub mod validation;
pub mod user;
pub mod post;
pub mod tag;

pub use validation::ValidationError;
pub use user::{NewUser, User, UserId};
pub use post::{NewPost, Post, PostAuthor, PostId, PostUpdate};
pub use tag::{Tag, TagId, TagName, TagUpsert};
