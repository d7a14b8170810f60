use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::error::DomainError;

pub const MAX_CONTENT_LEN: usize = 1000;

/// Post aggregate. Likes and comments live inside it and share its lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub likes: LikeSet,
    pub comments: CommentThread,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn new(author_id: Uuid, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            author_id,
            content,
            likes: LikeSet::default(),
            comments: CommentThread::default(),
            created_at: Utc::now(),
        }
    }

    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.author_id == user_id
    }

    /// Applies a change in place. On error the post is left untouched.
    pub fn apply(&mut self, change: PostChange) -> Result<(), DomainError> {
        match change {
            PostChange::ToggleLike { user_id } => {
                self.likes.toggle(user_id);
                Ok(())
            }
            PostChange::AddComment(comment) => {
                self.comments.prepend(comment);
                Ok(())
            }
            PostChange::DeleteComment {
                caller_id,
                comment_id,
            } => {
                let comment = self
                    .comments
                    .get(comment_id)
                    .ok_or(DomainError::CommentNotFound(comment_id))?;
                if comment.user_id != caller_id {
                    return Err(DomainError::Forbidden);
                }
                self.comments.remove(comment_id);
                Ok(())
            }
        }
    }
}

/// A mutation of a stored post, applied atomically by the repository.
#[derive(Debug, Clone)]
pub enum PostChange {
    ToggleLike { user_id: Uuid },
    AddComment(Comment),
    DeleteComment { caller_id: Uuid, comment_id: Uuid },
}

/// Users who like a post, most recent first. Each user appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LikeSet(Vec<Uuid>);

impl LikeSet {
    pub fn contains(&self, user_id: Uuid) -> bool {
        self.0.contains(&user_id)
    }

    /// Flips membership of `user_id`. Returns `true` if the user now likes the post.
    pub fn toggle(&mut self, user_id: Uuid) -> bool {
        match self.0.iter().position(|id| *id == user_id) {
            Some(index) => {
                self.0.remove(index);
                false
            }
            None => {
                self.0.insert(0, user_id);
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.0.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<Uuid> {
        self.iter().collect()
    }
}

/// Keeps the first occurrence of each user.
impl FromIterator<Uuid> for LikeSet {
    fn from_iter<I: IntoIterator<Item = Uuid>>(iter: I) -> Self {
        let mut likes = Vec::new();
        for user_id in iter {
            if !likes.contains(&user_id) {
                likes.push(user_id);
            }
        }
        Self(likes)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(user_id: Uuid, text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            text,
            created_at: Utc::now(),
        }
    }
}

/// Comments of a post, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentThread(Vec<Comment>);

impl CommentThread {
    pub fn prepend(&mut self, comment: Comment) {
        self.0.insert(0, comment);
    }

    pub fn get(&self, id: Uuid) -> Option<&Comment> {
        self.0.iter().find(|comment| comment.id == id)
    }

    /// Removes exactly one comment, keeping the order of the rest.
    pub fn remove(&mut self, id: Uuid) -> Option<Comment> {
        let index = self.0.iter().position(|comment| comment.id == id)?;
        Some(self.0.remove(index))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Comment> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<Comment> {
        self.0
    }
}

impl From<Vec<Comment>> for CommentThread {
    fn from(comments: Vec<Comment>) -> Self {
        Self(comments)
    }
}

pub fn validate_content(content: &str) -> Result<String, DomainError> {
    if content.trim().is_empty() {
        return Err(DomainError::validation("content", "content is required"));
    }
    if content.contains('\0') {
        return Err(DomainError::validation(
            "content",
            "content must not contain NUL characters",
        ));
    }
    if content.chars().count() > MAX_CONTENT_LEN {
        return Err(DomainError::validation(
            "content",
            format!("content must be at most {MAX_CONTENT_LEN} characters"),
        ));
    }
    Ok(content.to_string())
}

pub fn validate_comment_text(text: &str) -> Result<String, DomainError> {
    if text.trim().is_empty() {
        return Err(DomainError::validation("text", "text is required"));
    }
    if text.contains('\0') {
        return Err(DomainError::validation(
            "text",
            "text must not contain NUL characters",
        ));
    }
    if text.chars().count() > MAX_CONTENT_LEN {
        return Err(DomainError::validation(
            "text",
            format!("text must be at most {MAX_CONTENT_LEN} characters"),
        ));
    }
    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_with_comments(author: Uuid, commenters: &[Uuid]) -> Post {
        let mut post = Post::new(author, "hello".into());
        for (i, user) in commenters.iter().enumerate() {
            post.apply(PostChange::AddComment(Comment::new(*user, format!("c{i}"))))
                .unwrap();
        }
        post
    }

    #[test]
    fn new_post_has_no_likes_or_comments() {
        let post = Post::new(Uuid::new_v4(), "hello".into());
        assert!(post.likes.is_empty());
        assert!(post.comments.is_empty());
    }

    #[test]
    fn toggle_like_twice_restores_like_set() {
        let caller = Uuid::new_v4();
        let mut post = Post::new(Uuid::new_v4(), "hello".into());
        post.likes.toggle(Uuid::new_v4());
        let before = post.likes.clone();

        post.apply(PostChange::ToggleLike { user_id: caller }).unwrap();
        assert!(post.likes.contains(caller));
        assert_eq!(post.likes.len(), 2);

        post.apply(PostChange::ToggleLike { user_id: caller }).unwrap();
        assert_eq!(post.likes, before);
    }

    #[test]
    fn like_set_never_holds_duplicates() {
        let user = Uuid::new_v4();
        let likes: LikeSet = [user, user, user].into_iter().collect();
        assert_eq!(likes.len(), 1);
    }

    #[test]
    fn most_recent_liker_comes_first() {
        let (ada, bob, cy) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let mut likes = LikeSet::default();
        for user in [ada, bob, cy] {
            assert!(likes.toggle(user));
        }
        assert_eq!(likes.to_vec(), [cy, bob, ada]);

        assert!(!likes.toggle(bob));
        assert!(likes.toggle(bob));
        assert_eq!(likes.to_vec(), [bob, cy, ada]);
    }

    #[test]
    fn comments_are_newest_first() {
        let user = Uuid::new_v4();
        let post = post_with_comments(Uuid::new_v4(), &[user, user, user]);
        let texts: Vec<_> = post.comments.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["c2", "c1", "c0"]);
    }

    #[test]
    fn add_then_delete_comment_restores_thread() {
        let user = Uuid::new_v4();
        let mut post = post_with_comments(Uuid::new_v4(), &[user, Uuid::new_v4()]);
        let before = post.comments.clone();

        let comment = Comment::new(user, "short lived".into());
        let comment_id = comment.id;
        post.apply(PostChange::AddComment(comment)).unwrap();
        post.apply(PostChange::DeleteComment {
            caller_id: user,
            comment_id,
        })
        .unwrap();

        assert_eq!(post.comments, before);
    }

    #[test]
    fn deleting_a_middle_comment_keeps_order() {
        let user = Uuid::new_v4();
        let mut post = post_with_comments(Uuid::new_v4(), &[user, user, user]);
        let middle = post.comments.iter().nth(1).unwrap().id;

        post.apply(PostChange::DeleteComment {
            caller_id: user,
            comment_id: middle,
        })
        .unwrap();

        let texts: Vec<_> = post.comments.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["c2", "c0"]);
    }

    #[test]
    fn post_author_cannot_delete_someone_elses_comment() {
        let author = Uuid::new_v4();
        let commenter = Uuid::new_v4();
        let mut post = post_with_comments(author, &[commenter]);
        let comment_id = post.comments.iter().next().unwrap().id;
        let before = post.clone();

        let result = post.apply(PostChange::DeleteComment {
            caller_id: author,
            comment_id,
        });

        assert!(matches!(result, Err(DomainError::Forbidden)));
        assert_eq!(post, before);
    }

    #[test]
    fn deleting_unknown_comment_is_not_found() {
        let mut post = Post::new(Uuid::new_v4(), "hello".into());
        let missing = Uuid::new_v4();
        let result = post.apply(PostChange::DeleteComment {
            caller_id: post.author_id,
            comment_id: missing,
        });
        assert!(matches!(result, Err(DomainError::CommentNotFound(id)) if id == missing));
    }

    #[test]
    fn content_bounds() {
        assert!(validate_content("").is_err());
        assert!(validate_content("  \n\t").is_err());
        assert!(validate_content(&"a".repeat(MAX_CONTENT_LEN)).is_ok());
        assert!(validate_content(&"a".repeat(MAX_CONTENT_LEN + 1)).is_err());
        // length is counted in characters, not bytes
        assert!(validate_content(&"é".repeat(MAX_CONTENT_LEN)).is_ok());
    }

    #[test]
    fn nul_characters_are_rejected() {
        assert!(matches!(
            validate_content("hello\0world"),
            Err(DomainError::Validation { field: "content", .. })
        ));
        assert!(matches!(
            validate_comment_text("\0"),
            Err(DomainError::Validation { field: "text", .. })
        ));
    }

    #[test]
    fn empty_comment_text_is_rejected() {
        assert!(matches!(
            validate_comment_text(" "),
            Err(DomainError::Validation { field: "text", .. })
        ));
    }
}
