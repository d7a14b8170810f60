use crate::domain::error::DomainError;
use crate::domain::post::{CommentThread, LikeSet, Post, PostChange};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::{error, info};
use uuid::Uuid;

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(&self, post: Post) -> Result<Post, DomainError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, DomainError>;
    /// Newest first. `author_id` restricts the listing to one author.
    async fn list(&self, author_id: Option<Uuid>) -> Result<Vec<Post>, DomainError>;
    /// Applies `change` to the stored post as one read-modify-write.
    async fn update(&self, id: Uuid, change: PostChange) -> Result<Post, DomainError>;
    async fn delete_post(&self, id: Uuid, author_id: Uuid) -> Result<(), DomainError>;
}

#[derive(sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    author_id: Uuid,
    content: String,
    likes: Vec<Uuid>,
    comments: Json<CommentThread>,
    created_at: DateTime<Utc>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            author_id: row.author_id,
            content: row.content,
            likes: row.likes.into_iter().collect::<LikeSet>(),
            comments: row.comments.0,
            created_at: row.created_at,
        }
    }
}

#[derive(Clone)]
pub struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, post: Post) -> Result<Post, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO posts (id, author_id, content, likes, comments, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(post.id)
        .bind(post.author_id)
        .bind(&post.content)
        .bind(post.likes.to_vec())
        .bind(Json(&post.comments))
        .bind(post.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to create post: {}", e);
            DomainError::Internal(format!("database error: {}", e))
        })?;

        info!(post_id = %post.id, author_id = %post.author_id, "post created");
        Ok(post)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, author_id, content, likes, comments, created_at
            FROM posts WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("db error find_by_id {}: {}", id, e);
            DomainError::Internal(e.to_string())
        })?;

        Ok(row.map(Post::from))
    }

    async fn list(&self, author_id: Option<Uuid>) -> Result<Vec<Post>, DomainError> {
        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, author_id, content, likes, comments, created_at
            FROM posts
            WHERE $1::uuid IS NULL OR author_id = $1
            ORDER BY created_at DESC, seq DESC
            "#,
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("db error while fetching posts: {}", e);
            DomainError::Internal(e.to_string())
        })?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn update(&self, id: Uuid, change: PostChange) -> Result<Post, DomainError> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            error!("failed to open transaction for post {}: {}", id, e);
            DomainError::Internal(e.to_string())
        })?;

        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, author_id, content, likes, comments, created_at
            FROM posts WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            error!("failed to lock post {}: {}", id, e);
            DomainError::Internal(e.to_string())
        })?;

        // Dropping the transaction on an error path rolls it back.
        let mut post = Post::from(row.ok_or(DomainError::PostNotFound(id))?);
        post.apply(change)?;

        sqlx::query("UPDATE posts SET likes = $1, comments = $2 WHERE id = $3")
            .bind(post.likes.to_vec())
            .bind(Json(&post.comments))
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!("failed to update post {}: {}", id, e);
                DomainError::Internal(e.to_string())
            })?;

        tx.commit().await.map_err(|e| {
            error!("failed to commit post {}: {}", id, e);
            DomainError::Internal(e.to_string())
        })?;

        info!(post_id = %id, "post updated");
        Ok(post)
    }

    async fn delete_post(&self, id: Uuid, author_id: Uuid) -> Result<(), DomainError> {
        let deleted = sqlx::query("DELETE FROM posts WHERE id = $1 AND author_id = $2")
            .bind(id)
            .bind(author_id)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        if deleted.rows_affected() == 0 {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM posts WHERE id = $1)")
                    .bind(id)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(|e| DomainError::Internal(e.to_string()))?;

            return if exists {
                Err(DomainError::Forbidden)
            } else {
                Err(DomainError::PostNotFound(id))
            };
        }

        info!(post_id = %id, "post deleted");
        Ok(())
    }
}
