/// Data models for the blog service
///
/// Row structures for users, posts, and comments. Post and comment rows
/// are loaded joined with the author username (and, for comments, the
/// parent post's author) so responses and permission checks need no
/// second query.
use crate::middleware::permissions::ResourceView;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// User account
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Blog post row, joined with the author's username
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub author: String,
    pub title: String,
    pub content: String,
    pub summary: String,
    pub tags: Json<Vec<String>>,
    pub published_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
}

impl Post {
    /// Projection consulted by the authorization policy.
    pub fn ownership(&self) -> ResourceView {
        ResourceView::Post {
            author_id: self.author_id,
        }
    }
}

/// Comment row, joined with the author's username and the parent post's
/// author id (the latter feeds the delete policy)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub author_username: String,
    pub post_author_id: Uuid,
    pub content: String,
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
}

impl Comment {
    pub fn ownership(&self) -> ResourceView {
        ResourceView::Comment {
            author_id: self.author_id,
            post_author_id: self.post_author_id,
        }
    }
}
