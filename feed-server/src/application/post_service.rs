use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::data::post_repository::PostRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::post::{
    Comment, CommentThread, Post, PostChange, validate_comment_text, validate_content,
};
use crate::presentation::dto::{AuthorResponse, CommentResponse, PostResponse};
use tracing::instrument;
use uuid::Uuid;

#[derive(Clone)]
pub struct PostService {
    repo: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
}

impl PostService {
    pub fn new(repo: Arc<dyn PostRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { repo, users }
    }

    pub async fn get_post(&self, id: Uuid) -> Result<PostResponse, DomainError> {
        let post = self.find(id).await?;
        let mut resolved = self.resolve_posts(vec![post]).await?;
        resolved
            .pop()
            .ok_or_else(|| DomainError::Internal(format!("post {id} lost during resolution")))
    }

    pub async fn get_posts(&self) -> Result<Vec<PostResponse>, DomainError> {
        let posts = self.repo.list(None).await?;
        self.resolve_posts(posts).await
    }

    pub async fn get_posts_by_author(
        &self,
        author_id: Uuid,
    ) -> Result<Vec<PostResponse>, DomainError> {
        let posts = self.repo.list(Some(author_id)).await?;
        self.resolve_posts(posts).await
    }

    #[instrument(skip(self, content))]
    pub async fn create_post(
        &self,
        author_id: Uuid,
        content: String,
    ) -> Result<PostResponse, DomainError> {
        let content = validate_content(&content)?;
        self.require_user(author_id).await?;

        let post = self.repo.create(Post::new(author_id, content)).await?;
        let mut resolved = self.resolve_posts(vec![post]).await?;
        resolved
            .pop()
            .ok_or_else(|| DomainError::Internal("created post lost during resolution".into()))
    }

    #[instrument(skip(self))]
    pub async fn delete_post(&self, caller_id: Uuid, post_id: Uuid) -> Result<(), DomainError> {
        self.require_user(caller_id).await?;
        let post = self.find(post_id).await?;
        if !post.is_authored_by(caller_id) {
            return Err(DomainError::Forbidden);
        }
        self.repo.delete_post(post_id, caller_id).await
    }

    /// Likes the post if the caller has not liked it yet, unlikes it otherwise.
    #[instrument(skip(self))]
    pub async fn toggle_like(
        &self,
        caller_id: Uuid,
        post_id: Uuid,
    ) -> Result<Vec<Uuid>, DomainError> {
        self.require_user(caller_id).await?;
        let post = self
            .repo
            .update(post_id, PostChange::ToggleLike { user_id: caller_id })
            .await?;
        Ok(post.likes.to_vec())
    }

    #[instrument(skip(self, text))]
    pub async fn add_comment(
        &self,
        caller_id: Uuid,
        post_id: Uuid,
        text: String,
    ) -> Result<Vec<CommentResponse>, DomainError> {
        let text = validate_comment_text(&text)?;
        self.require_user(caller_id).await?;

        let post = self
            .repo
            .update(
                post_id,
                PostChange::AddComment(Comment::new(caller_id, text)),
            )
            .await?;
        self.resolve_comments(post.comments).await
    }

    #[instrument(skip(self))]
    pub async fn delete_comment(
        &self,
        caller_id: Uuid,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Vec<CommentResponse>, DomainError> {
        self.require_user(caller_id).await?;
        let post = self
            .repo
            .update(
                post_id,
                PostChange::DeleteComment {
                    caller_id,
                    comment_id,
                },
            )
            .await?;
        self.resolve_comments(post.comments).await
    }

    async fn find(&self, id: Uuid) -> Result<Post, DomainError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(DomainError::PostNotFound(id))
    }

    async fn require_user(&self, id: Uuid) -> Result<(), DomainError> {
        match self.users.find_by_id(id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::UserNotFound(id)),
        }
    }

    async fn resolve_posts(&self, posts: Vec<Post>) -> Result<Vec<PostResponse>, DomainError> {
        let ids = posts.iter().flat_map(|post| {
            std::iter::once(post.author_id).chain(post.comments.iter().map(|c| c.user_id))
        });
        let authors = self.authors(ids).await?;

        posts
            .into_iter()
            .map(|post| {
                let likes = post.likes.to_vec();
                Ok(PostResponse {
                    id: post.id,
                    author: lookup(&authors, post.author_id)?,
                    content: post.content,
                    likes,
                    comments: comment_responses(&authors, post.comments)?,
                    created_at: post.created_at,
                })
            })
            .collect()
    }

    async fn resolve_comments(
        &self,
        comments: CommentThread,
    ) -> Result<Vec<CommentResponse>, DomainError> {
        let authors = self.authors(comments.iter().map(|c| c.user_id)).await?;
        comment_responses(&authors, comments)
    }

    async fn authors(
        &self,
        ids: impl Iterator<Item = Uuid>,
    ) -> Result<HashMap<Uuid, AuthorResponse>, DomainError> {
        let ids: Vec<Uuid> = ids.collect::<BTreeSet<_>>().into_iter().collect();
        let users = self.users.find_by_ids(&ids).await?;
        Ok(users
            .into_iter()
            .map(|user| {
                (
                    user.id,
                    AuthorResponse {
                        id: user.id,
                        name: user.name,
                    },
                )
            })
            .collect())
    }
}

fn lookup(
    authors: &HashMap<Uuid, AuthorResponse>,
    id: Uuid,
) -> Result<AuthorResponse, DomainError> {
    authors
        .get(&id)
        .cloned()
        .ok_or_else(|| DomainError::Internal(format!("dangling user reference {id}")))
}

fn comment_responses(
    authors: &HashMap<Uuid, AuthorResponse>,
    comments: CommentThread,
) -> Result<Vec<CommentResponse>, DomainError> {
    comments
        .into_vec()
        .into_iter()
        .map(|comment| {
            let user = lookup(authors, comment.user_id)?;
            Ok(CommentResponse::new(comment, user))
        })
        .collect()
}
