//! In-process implementations of the repository ports.
//!
//! Used when no database is configured and by the test suite. Each post
//! mutation runs under the store's write lock, which gives the same
//! per-post atomicity as the row lock taken by the PostgreSQL repository.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::data::post_repository::PostRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostChange};
use crate::domain::user::{ProfileUpdate, User};

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, DomainError> {
        let mut users = self.users.write().await;
        if users.values().any(|existing| existing.email == user.email) {
            return Err(DomainError::validation("email", "user already exists"));
        }
        users.insert(user.id, user.clone());

        info!(user_id = %user.id, "user created");
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let users = self.users.read().await;
        Ok(users.values().find(|user| user.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, DomainError> {
        let users = self.users.read().await;
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        update: ProfileUpdate,
    ) -> Result<Option<User>, DomainError> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(&id) else {
            return Ok(None);
        };
        user.apply(update);

        info!(user_id = %id, "profile updated");
        Ok(Some(user.clone()))
    }
}

/// Posts kept in insertion order.
#[derive(Default)]
pub struct InMemoryPostRepository {
    posts: RwLock<Vec<Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn create(&self, post: Post) -> Result<Post, DomainError> {
        self.posts.write().await.push(post.clone());

        info!(post_id = %post.id, author_id = %post.author_id, "post created");
        Ok(post)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, DomainError> {
        let posts = self.posts.read().await;
        Ok(posts.iter().find(|post| post.id == id).cloned())
    }

    async fn list(&self, author_id: Option<Uuid>) -> Result<Vec<Post>, DomainError> {
        let posts = self.posts.read().await;
        // Latest insert first, so the stable sort keeps equal timestamps newest first.
        let mut listed: Vec<Post> = posts
            .iter()
            .rev()
            .filter(|post| author_id.is_none_or(|author| post.author_id == author))
            .cloned()
            .collect();
        listed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(listed)
    }

    async fn update(&self, id: Uuid, change: PostChange) -> Result<Post, DomainError> {
        let mut posts = self.posts.write().await;
        let stored = posts
            .iter_mut()
            .find(|post| post.id == id)
            .ok_or(DomainError::PostNotFound(id))?;

        let mut post = stored.clone();
        post.apply(change)?;
        *stored = post.clone();

        info!(post_id = %id, "post updated");
        Ok(post)
    }

    async fn delete_post(&self, id: Uuid, author_id: Uuid) -> Result<(), DomainError> {
        let mut posts = self.posts.write().await;
        let index = posts
            .iter()
            .position(|post| post.id == id)
            .ok_or(DomainError::PostNotFound(id))?;
        if !posts[index].is_authored_by(author_id) {
            return Err(DomainError::Forbidden);
        }
        posts.remove(index);

        info!(post_id = %id, "post deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};
    use futures_util::future::join_all;

    use super::*;
    use crate::domain::post::Comment;

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let repo = InMemoryUserRepository::new();
        repo.create(User::new("Ada".into(), "a@x.com".into(), "h".into(), None))
            .await
            .unwrap();

        let result = repo
            .create(User::new("Other".into(), "a@x.com".into(), "h".into(), None))
            .await;
        assert!(matches!(result, Err(DomainError::Validation { field: "email", .. })));
    }

    #[tokio::test]
    async fn list_orders_by_creation_time_descending() {
        let repo = InMemoryPostRepository::new();
        let author = Uuid::new_v4();
        let mut older = Post::new(author, "older".into());
        older.created_at = Utc::now() - Duration::minutes(5);
        let newer = Post::new(author, "newer".into());

        repo.create(newer.clone()).await.unwrap();
        repo.create(older.clone()).await.unwrap();

        let listed: Vec<_> = repo.list(None).await.unwrap();
        assert_eq!(listed[0].id, newer.id);
        assert_eq!(listed[1].id, older.id);
    }

    #[tokio::test]
    async fn list_filters_by_author() {
        let repo = InMemoryPostRepository::new();
        let ada = Uuid::new_v4();
        repo.create(Post::new(ada, "mine".into())).await.unwrap();
        repo.create(Post::new(Uuid::new_v4(), "theirs".into()))
            .await
            .unwrap();

        let listed = repo.list(Some(ada)).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].content, "mine");
    }

    #[tokio::test]
    async fn failed_change_leaves_stored_post_untouched() {
        let repo = InMemoryPostRepository::new();
        let commenter = Uuid::new_v4();
        let post = repo
            .create(Post::new(Uuid::new_v4(), "hello".into()))
            .await
            .unwrap();
        let post = repo
            .update(post.id, PostChange::AddComment(Comment::new(commenter, "hi".into())))
            .await
            .unwrap();
        let comment_id = post.comments.iter().next().unwrap().id;

        let result = repo
            .update(
                post.id,
                PostChange::DeleteComment {
                    caller_id: Uuid::new_v4(),
                    comment_id,
                },
            )
            .await;

        assert!(matches!(result, Err(DomainError::Forbidden)));
        assert_eq!(repo.find_by_id(post.id).await.unwrap().unwrap(), post);
    }

    #[tokio::test]
    async fn delete_checks_existence_before_ownership() {
        let repo = InMemoryPostRepository::new();
        let author = Uuid::new_v4();
        let post = repo.create(Post::new(author, "hello".into())).await.unwrap();

        assert!(matches!(
            repo.delete_post(Uuid::new_v4(), author).await,
            Err(DomainError::PostNotFound(_))
        ));
        assert!(matches!(
            repo.delete_post(post.id, Uuid::new_v4()).await,
            Err(DomainError::Forbidden)
        ));
        repo.delete_post(post.id, author).await.unwrap();
        assert!(repo.find_by_id(post.id).await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_likes_and_comments_are_all_kept() {
        const LIKERS: usize = 32;
        const COMMENTS: usize = 24;

        let repo = Arc::new(InMemoryPostRepository::new());
        let post_id = repo
            .create(Post::new(Uuid::new_v4(), "busy".into()))
            .await
            .unwrap()
            .id;

        let likes = (0..LIKERS).map(|_| {
            let repo = Arc::clone(&repo);
            tokio::spawn(async move {
                repo.update(
                    post_id,
                    PostChange::ToggleLike {
                        user_id: Uuid::new_v4(),
                    },
                )
                .await
            })
        });
        let comments = (0..COMMENTS).map(|i| {
            let repo = Arc::clone(&repo);
            tokio::spawn(async move {
                let comment = Comment::new(Uuid::new_v4(), format!("comment {i}"));
                repo.update(post_id, PostChange::AddComment(comment)).await
            })
        });

        let handles: Vec<_> = likes.chain(comments).collect();
        for result in join_all(handles).await {
            result.unwrap().unwrap();
        }

        let stored = repo.find_by_id(post_id).await.unwrap().unwrap();
        assert_eq!(stored.likes.len(), LIKERS);
        assert_eq!(stored.comments.len(), COMMENTS);
    }
}
