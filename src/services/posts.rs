/// Post service - post creation, retrieval, and management
///
/// Rows come back joined with the author's username so responses never
/// need a second lookup. Listings are newest-first with the id as a
/// tiebreaker for a stable total order.
use crate::error::Result;
use crate::models::Post;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

const POST_COLUMNS: &str = "p.id, p.author_id, u.username AS author, p.title, p.content, \
     p.summary, p.tags, p.published_date, p.updated_date";

pub struct PostService {
    pool: PgPool,
}

impl PostService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a post by ID
    pub async fn get_post(&self, post_id: Uuid) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(&format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts p
            JOIN users u ON u.id = p.author_id
            WHERE p.id = $1
            "#,
        ))
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    /// Whether a post with this id exists
    pub async fn post_exists(&self, post_id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM posts WHERE id = $1)")
            .bind(post_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    /// List all posts, newest first
    pub async fn list_posts(&self) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts p
            JOIN users u ON u.id = p.author_id
            ORDER BY p.published_date DESC, p.id DESC
            "#,
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    /// List a user's posts by username, newest first
    pub async fn list_user_posts(&self, username: &str) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts p
            JOIN users u ON u.id = p.author_id
            WHERE u.username = $1
            ORDER BY p.published_date DESC, p.id DESC
            "#,
        ))
        .bind(username)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    /// Create a new post
    pub async fn create_post(
        &self,
        author_id: Uuid,
        title: &str,
        content: &str,
        summary: &str,
        tags: Vec<String>,
    ) -> Result<Post> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            WITH inserted AS (
                INSERT INTO posts (author_id, title, content, summary, tags)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, author_id, title, content, summary, tags,
                          published_date, updated_date
            )
            SELECT i.id, i.author_id, u.username AS author, i.title, i.content,
                   i.summary, i.tags, i.published_date, i.updated_date
            FROM inserted i
            JOIN users u ON u.id = i.author_id
            "#,
        )
        .bind(author_id)
        .bind(title)
        .bind(content)
        .bind(summary)
        .bind(Json(tags))
        .fetch_one(&self.pool)
        .await?;

        Ok(post)
    }

    /// Replace a post's content fields (last writer wins)
    pub async fn update_post(
        &self,
        post_id: Uuid,
        title: &str,
        content: &str,
        summary: &str,
        tags: Vec<String>,
    ) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            WITH updated AS (
                UPDATE posts
                SET title = $2, content = $3, summary = $4, tags = $5, updated_date = NOW()
                WHERE id = $1
                RETURNING id, author_id, title, content, summary, tags,
                          published_date, updated_date
            )
            SELECT up.id, up.author_id, u.username AS author, up.title, up.content,
                   up.summary, up.tags, up.published_date, up.updated_date
            FROM updated up
            JOIN users u ON u.id = up.author_id
            "#,
        )
        .bind(post_id)
        .bind(title)
        .bind(content)
        .bind(summary)
        .bind(Json(tags))
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    /// Delete a post (comments cascade)
    pub async fn delete_post(&self, post_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
