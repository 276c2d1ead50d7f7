//! Sample data for local development
//!
//! Three users, three posts, and a handful of overlapping tags.

use sqlx::PgPool;

use super::repos::{DbError, PostRepo, UserRepo};
use super::schema;
use super::store::PgStore;
use crate::models::{NewPost, NewUser, TagName};
use crate::service::TagService;

/// Row counts after a seed run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeedSummary {
    pub users: usize,
    pub posts: usize,
    pub tags: usize,
}

const USERS: [(&str, &str, &str, &str); 3] = [
    ("dennis", "chillinlikeavillain", "Dennis C. Castro", "San Francisco, CA"),
    ("alison", "sweetandsmart", "Alison M. Tuffli", "Seattle, WA"),
    ("diego", "getoffmylawn", "Diego Angelo Castro", "Manila, Philippines"),
];

/// (author index, title, content, tags)
const POSTS: [(usize, &str, &str, &[&str]); 3] = [
    (
        0,
        "This class rocks!",
        "I am seeding data now. I am learning so much in this class.",
        &["#happy", "#youcandoanything"],
    ),
    (
        1,
        "Getting less complicated every day",
        "OK, now I've done this. What's next?",
        &["#happy", "#worst-day-ever"],
    ),
    (
        2,
        "I am so far away",
        "I am feeling much better today. Just getting over some major illness.",
        &["#happy", "#youcandoanything", "#catmandoeverything"],
    ),
];

/// Insert the sample rows, optionally dropping every table first.
///
/// Without `reset`, a second run fails on the unique usernames.
pub async fn run(pool: &PgPool, reset: bool) -> Result<SeedSummary, DbError> {
    if reset {
        schema::drop_all(pool).await?;
    }
    schema::ensure(pool).await?;

    let users = UserRepo::new(pool);
    for (username, password, name, location) in USERS {
        users
            .create(&NewUser {
                username: username.to_owned(),
                password: password.to_owned(),
                name: name.to_owned(),
                location: location.to_owned(),
            })
            .await?;
    }

    // Authors are read back by username, as other rows may already exist
    let authors = users.list().await?;
    let store = PgStore::new(pool.clone());
    let service = TagService::new(&store);

    for (author, title, content, tags) in POSTS {
        let username = USERS[author].0;
        let author = authors
            .iter()
            .find(|u| u.username == username)
            .ok_or_else(|| DbError::not_found("user", username))?;

        let post = PostRepo::new(pool)
            .create(&NewPost {
                author_id: author.id,
                title: title.to_owned(),
                content: content.to_owned(),
            })
            .await?;

        let names = tags
            .iter()
            .filter_map(|t| TagName::new(t).ok())
            .collect::<Vec<_>>();
        service.tag_post(post.id, &names).await?;
    }

    let summary = SeedSummary {
        users: users.list().await?.len(),
        posts: PostRepo::new(pool).list().await?.len(),
        tags: service.all_tags().await?.len(),
    };
    tracing::info!(
        users = summary.users,
        posts = summary.posts,
        tags = summary.tags,
        "seed complete"
    );

    Ok(summary)
}
