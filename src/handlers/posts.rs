/// Post handlers - HTTP endpoints for post operations
use crate::error::{AppError, Result};
use crate::middleware::permissions::{self, Identity};
use crate::middleware::UserId;
use crate::models::Post;
use crate::services::{MarkdownRenderer, PostService};
use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "Content may not be blank"))]
    pub content: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePostRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "Content may not be blank"))]
    pub content: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub content_html: String,
    pub summary: String,
    pub author: String,
    pub author_id: Uuid,
    pub published_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
    pub tags: Vec<String>,
}

impl PostResponse {
    /// Build the response DTO, rendering the markdown fresh so the HTML
    /// always reflects the current content.
    pub fn from_post(post: Post, renderer: &MarkdownRenderer) -> Self {
        let content_html = renderer.render(&post.content);
        Self {
            id: post.id,
            title: post.title,
            content_html,
            content: post.content,
            summary: post.summary,
            author: post.author,
            author_id: post.author_id,
            published_date: post.published_date,
            updated_date: post.updated_date,
            tags: post.tags.0,
        }
    }
}

/// List all posts, newest first
pub async fn list_posts(
    pool: web::Data<PgPool>,
    renderer: web::Data<MarkdownRenderer>,
) -> Result<HttpResponse> {
    let service = PostService::new((**pool).clone());
    let posts = service.list_posts().await?;

    let body: Vec<PostResponse> = posts
        .into_iter()
        .map(|p| PostResponse::from_post(p, &renderer))
        .collect();

    Ok(HttpResponse::Ok().json(body))
}

/// List a user's posts, newest first
pub async fn get_user_posts(
    pool: web::Data<PgPool>,
    renderer: web::Data<MarkdownRenderer>,
    username: web::Path<String>,
) -> Result<HttpResponse> {
    let service = PostService::new((**pool).clone());
    let posts = service.list_user_posts(&username).await?;

    let body: Vec<PostResponse> = posts
        .into_iter()
        .map(|p| PostResponse::from_post(p, &renderer))
        .collect();

    Ok(HttpResponse::Ok().json(body))
}

/// Create a new post
pub async fn create_post(
    pool: web::Data<PgPool>,
    renderer: web::Data<MarkdownRenderer>,
    user_id: UserId,
    req: web::Json<CreatePostRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let service = PostService::new((**pool).clone());
    let post = service
        .create_post(
            user_id.0,
            &req.title,
            &req.content,
            &req.summary,
            req.tags.clone(),
        )
        .await?;

    Ok(HttpResponse::Created().json(PostResponse::from_post(post, &renderer)))
}

/// Get a post by ID
pub async fn get_post(
    pool: web::Data<PgPool>,
    renderer: web::Data<MarkdownRenderer>,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let service = PostService::new((**pool).clone());
    let post = service
        .get_post(*post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    Ok(HttpResponse::Ok().json(PostResponse::from_post(post, &renderer)))
}

/// Update a post (author only)
pub async fn update_post(
    pool: web::Data<PgPool>,
    renderer: web::Data<MarkdownRenderer>,
    post_id: web::Path<Uuid>,
    user_id: UserId,
    req: web::Json<UpdatePostRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let service = PostService::new((**pool).clone());
    let post = service
        .get_post(*post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    permissions::check_write(&Identity::Authenticated(user_id.0), &post.ownership())?;

    let updated = service
        .update_post(
            *post_id,
            &req.title,
            &req.content,
            &req.summary,
            req.tags.clone(),
        )
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    Ok(HttpResponse::Ok().json(PostResponse::from_post(updated, &renderer)))
}

/// Delete a post (author only)
pub async fn delete_post(
    pool: web::Data<PgPool>,
    post_id: web::Path<Uuid>,
    user_id: UserId,
) -> Result<HttpResponse> {
    let service = PostService::new((**pool).clone());
    let post = service
        .get_post(*post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    permissions::check_delete(&Identity::Authenticated(user_id.0), &post.ownership())?;

    service.delete_post(*post_id).await?;

    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::types::Json;

    fn sample_post(tags: Vec<String>) -> Post {
        Post {
            id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            author: "testuser".to_string(),
            title: "Test Post".to_string(),
            content: "# Heading\n\nsome **bold** text".to_string(),
            summary: "Test Summary".to_string(),
            tags: Json(tags),
            published_date: Utc::now(),
            updated_date: Utc::now(),
        }
    }

    #[test]
    fn test_response_preserves_tag_order() {
        let renderer = MarkdownRenderer::new();
        let post = sample_post(vec!["a".to_string(), "b".to_string()]);

        let response = PostResponse::from_post(post, &renderer);
        assert_eq!(response.tags, vec!["a", "b"]);
    }

    #[test]
    fn test_response_renders_content_html() {
        let renderer = MarkdownRenderer::new();
        let post = sample_post(vec![]);

        let response = PostResponse::from_post(post, &renderer);
        assert!(response.content_html.contains("<h1>"));
        assert!(response.content_html.contains("<strong>bold</strong>"));
        // Raw markdown travels alongside the rendered HTML.
        assert!(response.content.starts_with("# Heading"));
        assert_eq!(response.author, "testuser");
    }

    #[test]
    fn test_create_request_rejects_blank_title() {
        let req = CreatePostRequest {
            title: String::new(),
            content: "body".to_string(),
            summary: String::new(),
            tags: vec![],
        };

        let errors = req.validate().expect_err("blank title must fail");
        assert!(errors.field_errors().contains_key("title"));
    }

    #[test]
    fn test_create_request_rejects_blank_content() {
        let req = CreatePostRequest {
            title: "Title".to_string(),
            content: String::new(),
            summary: String::new(),
            tags: vec![],
        };

        let errors = req.validate().expect_err("blank content must fail");
        assert!(errors.field_errors().contains_key("content"));
    }

    #[test]
    fn test_create_request_accepts_optional_fields_missing() {
        let req: CreatePostRequest =
            serde_json::from_str(r#"{"title": "T", "content": "C"}"#).expect("should deserialize");

        assert!(req.validate().is_ok());
        assert_eq!(req.summary, "");
        assert!(req.tags.is_empty());
    }
}
