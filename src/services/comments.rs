/// Comment service - comment creation, retrieval, and management
///
/// Rows are joined with the comment author's username and the parent
/// post's author id; the latter feeds the moderation rule in the delete
/// policy. Listings are oldest-first.
use crate::error::Result;
use crate::models::Comment;
use sqlx::PgPool;
use uuid::Uuid;

const COMMENT_COLUMNS: &str = "c.id, c.post_id, c.author_id, u.username AS author_username, \
     p.author_id AS post_author_id, c.content, c.created_date, c.updated_date";

pub struct CommentService {
    pool: PgPool,
}

impl CommentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a comment by ID
    pub async fn get_comment(&self, comment_id: Uuid) -> Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM comments c
            JOIN users u ON u.id = c.author_id
            JOIN posts p ON p.id = c.post_id
            WHERE c.id = $1
            "#,
        ))
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    /// Get comments for a post, oldest first
    pub async fn get_post_comments(&self, post_id: Uuid) -> Result<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(&format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM comments c
            JOIN users u ON u.id = c.author_id
            JOIN posts p ON p.id = c.post_id
            WHERE c.post_id = $1
            ORDER BY c.created_date ASC, c.id ASC
            "#,
        ))
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    /// Create a new comment
    pub async fn create_comment(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        content: &str,
    ) -> Result<Comment> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            WITH inserted AS (
                INSERT INTO comments (post_id, author_id, content)
                VALUES ($1, $2, $3)
                RETURNING id, post_id, author_id, content, created_date, updated_date
            )
            SELECT i.id, i.post_id, i.author_id, u.username AS author_username,
                   p.author_id AS post_author_id, i.content, i.created_date, i.updated_date
            FROM inserted i
            JOIN users u ON u.id = i.author_id
            JOIN posts p ON p.id = i.post_id
            "#,
        )
        .bind(post_id)
        .bind(author_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(comment)
    }

    /// Update comment content (last writer wins)
    pub async fn update_comment(&self, comment_id: Uuid, content: &str) -> Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            WITH updated AS (
                UPDATE comments
                SET content = $2, updated_date = NOW()
                WHERE id = $1
                RETURNING id, post_id, author_id, content, created_date, updated_date
            )
            SELECT up.id, up.post_id, up.author_id, u.username AS author_username,
                   p.author_id AS post_author_id, up.content, up.created_date, up.updated_date
            FROM updated up
            JOIN users u ON u.id = up.author_id
            JOIN posts p ON p.id = up.post_id
            "#,
        )
        .bind(comment_id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    /// Delete a comment
    pub async fn delete_comment(&self, comment_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(comment_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
