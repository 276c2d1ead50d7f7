//! Tag resolution and post visibility
//!
//! The store returns every post carrying a tag; whether a given viewer may
//! see each one is decided here and nowhere else. Store errors pass through
//! untouched.

use crate::db::{BlogStore, DbError};
use crate::models::{Post, PostId, Tag, TagName, User, UserId};

/// A post is visible when it is active, or when the viewer wrote it.
pub fn is_visible(post: &Post, viewer: Option<&User>) -> bool {
    post.active || viewer.is_some_and(|v| v.id == post.author_id())
}

/// Tag queries and tag/post linking over an injected store
pub struct TagService<'a> {
    store: &'a dyn BlogStore,
}

impl<'a> TagService<'a> {
    pub fn new(store: &'a dyn BlogStore) -> Self {
        Self { store }
    }

    pub async fn all_tags(&self) -> Result<Vec<Tag>, DbError> {
        self.store.all_tags().await
    }

    /// Posts carrying `tag_name` that `viewer` may see, in store order.
    ///
    /// An unknown tag yields an empty list. Without a viewer only active
    /// posts survive; with one, their own inactive posts are kept too.
    pub async fn resolve_posts_for_tag(
        &self,
        tag_name: &str,
        viewer: Option<&User>,
    ) -> Result<Vec<Post>, DbError> {
        let candidates = self.store.posts_by_tag_name(tag_name).await?;
        let total = candidates.len();

        let visible: Vec<Post> = candidates
            .into_iter()
            .filter(|post| is_visible(post, viewer))
            .collect();

        tracing::debug!(
            tag = %tag_name,
            viewer = ?viewer.map(|v| v.id),
            total,
            visible = visible.len(),
            "resolved posts for tag"
        );

        Ok(visible)
    }

    /// Get-or-create each distinct name.
    pub async fn create_tags(&self, names: &[TagName]) -> Result<Vec<Tag>, DbError> {
        self.store.create_tags(names).await
    }

    /// Ensure `names` exist, link them to the post, and return the post.
    pub async fn tag_post(&self, post_id: PostId, names: &[TagName]) -> Result<Post, DbError> {
        let tags = self.create_tags(names).await?;
        let ids: Vec<_> = tags.iter().map(|t| t.id).collect();

        self.store.add_tags_to_post(post_id, &ids).await?;
        self.store.post_by_id(post_id).await
    }

    /// Replace the post's tag set with exactly `names`.
    ///
    /// New names are created first; the swap itself is a single store call,
    /// so a failure leaves the post with its previous tags.
    pub async fn retag_post(&self, post_id: PostId, names: &[TagName]) -> Result<Post, DbError> {
        // Fails before any tag is created when the post is missing.
        self.store.post_by_id(post_id).await?;

        let tags = self.create_tags(names).await?;
        let ids: Vec<_> = tags.iter().map(|t| t.id).collect();

        let removed = self.store.replace_post_tags(post_id, &ids).await?;
        tracing::debug!(post_id = %post_id, removed, kept = ids.len(), "post retagged");

        self.store.post_by_id(post_id).await
    }

    /// Look up the requesting user. An id that matches nobody is treated as
    /// an anonymous viewer; other store errors pass through.
    pub async fn resolve_viewer(&self, id: Option<UserId>) -> Result<Option<User>, DbError> {
        let Some(id) = id else {
            return Ok(None);
        };

        match self.store.user_by_id(id).await {
            Ok(user) => Ok(Some(user)),
            Err(DbError::NotFound { .. }) => {
                tracing::debug!(user_id = %id, "unknown viewer, treating as anonymous");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{NewPost, NewUser, PostUpdate, TagId, TagUpsert};

    fn names(raw: &[&str]) -> Vec<TagName> {
        raw.iter().map(|n| TagName::new(n).unwrap()).collect()
    }

    fn user(store: &MemoryStore, username: &str) -> User {
        store.insert_user(NewUser {
            username: username.into(),
            password: "secret".into(),
            name: username.into(),
            location: "Seattle, WA".into(),
        })
    }

    fn post(store: &MemoryStore, author: &User, title: &str, active: bool) -> PostId {
        let id = store
            .insert_post(NewPost {
                author_id: author.id,
                title: title.into(),
                content: format!("{title} content"),
            })
            .unwrap();
        if !active {
            store
                .update_post(
                    id,
                    PostUpdate {
                        active: Some(false),
                        ..Default::default()
                    },
                )
                .unwrap();
        }
        id
    }

    /// `#happy` on A (active, by U1) and B (inactive, by U2).
    async fn happy_fixture() -> (MemoryStore, User, User, PostId, PostId) {
        let store = MemoryStore::new();
        let u1 = user(&store, "dennis");
        let u2 = user(&store, "alison");
        let a = post(&store, &u1, "A", true);
        let b = post(&store, &u2, "B", false);

        let service = TagService::new(&store);
        service.tag_post(a, &names(&["#happy"])).await.unwrap();
        service.tag_post(b, &names(&["#happy"])).await.unwrap();

        (store, u1, u2, a, b)
    }

    fn ids(posts: &[Post]) -> Vec<PostId> {
        posts.iter().map(|p| p.id).collect()
    }

    #[tokio::test]
    async fn anonymous_viewer_sees_only_active_posts() {
        let (store, _, _, a, _) = happy_fixture().await;
        let posts = TagService::new(&store)
            .resolve_posts_for_tag("#happy", None)
            .await
            .unwrap();

        assert_eq!(ids(&posts), vec![a]);
    }

    #[tokio::test]
    async fn author_sees_own_inactive_post() {
        let (store, _, u2, a, b) = happy_fixture().await;
        let posts = TagService::new(&store)
            .resolve_posts_for_tag("#happy", Some(&u2))
            .await
            .unwrap();

        assert_eq!(ids(&posts), vec![a, b]);
    }

    #[tokio::test]
    async fn other_viewer_does_not_see_inactive_post() {
        let (store, u1, _, a, _) = happy_fixture().await;
        let posts = TagService::new(&store)
            .resolve_posts_for_tag("#happy", Some(&u1))
            .await
            .unwrap();

        assert_eq!(ids(&posts), vec![a]);
    }

    #[tokio::test]
    async fn unknown_or_unused_tag_is_empty() {
        let (store, _, u2, _, _) = happy_fixture().await;
        let service = TagService::new(&store);
        service.create_tags(&names(&["#unused"])).await.unwrap();

        for viewer in [None, Some(&u2)] {
            assert!(service
                .resolve_posts_for_tag("#unused", viewer)
                .await
                .unwrap()
                .is_empty());
            assert!(service
                .resolve_posts_for_tag("#never-created", viewer)
                .await
                .unwrap()
                .is_empty());
        }
    }

    #[tokio::test]
    async fn visibility_matches_predicate_for_every_combination() {
        let store = MemoryStore::new();
        let authors = [user(&store, "dennis"), user(&store, "alison")];
        let mut expected_anon = Vec::new();
        let mut expected_by_author = [Vec::new(), Vec::new()];

        for (i, author) in authors.iter().enumerate() {
            for active in [true, false] {
                let id = post(&store, author, &format!("{}-{active}", author.username), active);
                TagService::new(&store)
                    .tag_post(id, &names(&["#all"]))
                    .await
                    .unwrap();

                if active {
                    expected_anon.push(id);
                }
                for (j, list) in expected_by_author.iter_mut().enumerate() {
                    if active || i == j {
                        list.push(id);
                    }
                }
            }
        }

        let service = TagService::new(&store);
        let anon = service.resolve_posts_for_tag("#all", None).await.unwrap();
        assert_eq!(ids(&anon), expected_anon);

        for (j, author) in authors.iter().enumerate() {
            let seen = service
                .resolve_posts_for_tag("#all", Some(author))
                .await
                .unwrap();
            assert_eq!(ids(&seen), expected_by_author[j]);
        }
    }

    #[tokio::test]
    async fn create_tags_is_idempotent() {
        let store = MemoryStore::new();
        let service = TagService::new(&store);
        let wanted = names(&["#happy", "#worst-day-ever", "#happy"]);

        let first = service.create_tags(&wanted).await.unwrap();
        let second = service.create_tags(&wanted).await.unwrap();

        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
        assert_eq!(store.all_tags().await.unwrap(), first);
    }

    #[tokio::test]
    async fn tagging_twice_keeps_one_link() {
        let store = MemoryStore::new();
        let author = user(&store, "diego");
        let id = post(&store, &author, "I am so far away", true);
        let service = TagService::new(&store);

        service.tag_post(id, &names(&["#happy"])).await.unwrap();
        let post = service.tag_post(id, &names(&["#happy"])).await.unwrap();

        assert_eq!(store.link_count(id), 1);
        assert_eq!(post.tags.len(), 1);
    }

    #[tokio::test]
    async fn retag_replaces_tag_set() {
        let store = MemoryStore::new();
        let author = user(&store, "dennis");
        let id = post(&store, &author, "This class rocks!", true);
        let service = TagService::new(&store);

        service
            .tag_post(id, &names(&["#happy", "#youcandoanything"]))
            .await
            .unwrap();
        let post = service
            .retag_post(id, &names(&["#youcandoanything", "#redfish", "#bluefish"]))
            .await
            .unwrap();

        let tag_names: Vec<_> = post.tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(tag_names, vec!["#youcandoanything", "#redfish", "#bluefish"]);
        assert!(service
            .resolve_posts_for_tag("#happy", None)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn missing_post_is_not_found() {
        let store = MemoryStore::new();
        let service = TagService::new(&store);

        let err = service
            .tag_post(PostId(99), &names(&["#happy"]))
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let err = service.retag_post(PostId(99), &[]).await.unwrap_err();
        assert!(err.is_not_found());

        let err = store.post_by_id(PostId(99)).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { resource: "post", .. }));
    }

    #[tokio::test]
    async fn store_failure_propagates_without_partial_results() {
        let (store, _, _, _, _) = happy_fixture().await;
        store.set_failing(true);

        let err = TagService::new(&store)
            .resolve_posts_for_tag("#happy", None)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Sqlx(_)));
    }

    /// Memory store whose tag replacement can be made to fail on a link
    /// target that doesn't exist.
    struct BrokenLinks {
        inner: MemoryStore,
        broken: AtomicBool,
    }

    #[async_trait]
    impl BlogStore for BrokenLinks {
        async fn all_tags(&self) -> Result<Vec<Tag>, DbError> {
            self.inner.all_tags().await
        }

        async fn get_or_create_tag(&self, name: &TagName) -> Result<TagUpsert, DbError> {
            self.inner.get_or_create_tag(name).await
        }

        async fn add_tags_to_post(&self, post_id: PostId, tag_ids: &[TagId]) -> Result<(), DbError> {
            self.inner.add_tags_to_post(post_id, tag_ids).await
        }

        async fn replace_post_tags(
            &self,
            post_id: PostId,
            tag_ids: &[TagId],
        ) -> Result<u64, DbError> {
            let mut ids = tag_ids.to_vec();
            if self.broken.load(Ordering::SeqCst) {
                // A link target that doesn't exist
                ids.push(TagId(i32::MAX));
            }
            self.inner.replace_post_tags(post_id, &ids).await
        }

        async fn posts_by_tag_name(&self, tag_name: &str) -> Result<Vec<Post>, DbError> {
            self.inner.posts_by_tag_name(tag_name).await
        }

        async fn post_by_id(&self, id: PostId) -> Result<Post, DbError> {
            self.inner.post_by_id(id).await
        }

        async fn user_by_id(&self, id: UserId) -> Result<User, DbError> {
            self.inner.user_by_id(id).await
        }
    }

    #[tokio::test]
    async fn failed_retag_keeps_previous_tags() {
        let store = BrokenLinks {
            inner: MemoryStore::new(),
            broken: AtomicBool::new(false),
        };
        let author = user(&store.inner, "dennis");
        let id = post(&store.inner, &author, "This class rocks!", true);
        let service = TagService::new(&store);
        let before = service.tag_post(id, &names(&["#happy"])).await.unwrap();

        store.broken.store(true, Ordering::SeqCst);
        assert!(service.retag_post(id, &names(&["#sad"])).await.is_err());

        let after = store.post_by_id(id).await.unwrap();
        assert_eq!(after.tags, before.tags);
        assert_eq!(
            ids(&service.resolve_posts_for_tag("#happy", None).await.unwrap()),
            vec![id]
        );
    }

    #[tokio::test]
    async fn resolve_viewer_treats_unknown_ids_as_anonymous() {
        let store = MemoryStore::new();
        let alison = user(&store, "alison");
        let service = TagService::new(&store);

        assert_eq!(service.resolve_viewer(None).await.unwrap(), None);
        assert_eq!(
            service.resolve_viewer(Some(alison.id)).await.unwrap(),
            Some(alison)
        );
        assert_eq!(service.resolve_viewer(Some(UserId(999))).await.unwrap(), None);

        store.set_failing(true);
        let err = service.resolve_viewer(Some(UserId(1))).await.unwrap_err();
        assert!(matches!(err, DbError::Sqlx(_)));
    }

    #[test]
    fn predicate_truth_table() {
        let author = User {
            id: UserId(1),
            username: "dennis".into(),
            password: String::new(),
            name: "Dennis".into(),
            location: "SF".into(),
            active: true,
        };
        let other = User {
            id: UserId(2),
            ..author.clone()
        };
        let mut p = Post {
            id: PostId(1),
            title: "t".into(),
            content: "c".into(),
            active: true,
            author: (&author).into(),
            tags: Vec::new(),
        };

        assert!(is_visible(&p, None));
        assert!(is_visible(&p, Some(&other)));

        p.active = false;
        assert!(!is_visible(&p, None));
        assert!(!is_visible(&p, Some(&other)));
        assert!(is_visible(&p, Some(&author)));
    }
}
