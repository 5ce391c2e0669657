/// Comment handlers - HTTP endpoints for comment operations
use crate::error::{AppError, Result};
use crate::middleware::permissions::{self, Identity};
use crate::middleware::UserId;
use crate::models::Comment;
use crate::services::{CommentService, MarkdownRenderer, PostService};
use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::borrow::Cow;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

#[derive(Debug, Deserialize)]
pub struct CommentListQuery {
    pub post_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    pub post_id: Uuid,
    #[validate(length(min = 1, message = "Content may not be blank"))]
    pub content: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCommentRequest {
    #[validate(length(min = 1, message = "Content may not be blank"))]
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub post: Uuid,
    pub author_id: Uuid,
    pub author_username: String,
    pub content: String,
    pub content_html: String,
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
}

impl CommentResponse {
    pub fn from_comment(comment: Comment, renderer: &MarkdownRenderer) -> Self {
        let content_html = renderer.render(&comment.content);
        Self {
            id: comment.id,
            post: comment.post_id,
            author_id: comment.author_id,
            author_username: comment.author_username,
            content_html,
            content: comment.content,
            created_date: comment.created_date,
            updated_date: comment.updated_date,
        }
    }
}

fn unknown_post_error() -> AppError {
    let mut errors = ValidationErrors::new();
    let mut error = ValidationError::new("does_not_exist");
    error.message = Some(Cow::from("Blog post does not exist"));
    errors.add("post_id", error);
    AppError::Validation(errors)
}

/// Get all comments for a post, oldest first
pub async fn list_comments(
    pool: web::Data<PgPool>,
    renderer: web::Data<MarkdownRenderer>,
    query: web::Query<CommentListQuery>,
) -> Result<HttpResponse> {
    let post_id = query
        .post_id
        .ok_or_else(|| AppError::BadRequest("post_id is required".to_string()))?;

    let posts = PostService::new((**pool).clone());
    if !posts.post_exists(post_id).await? {
        return Err(AppError::NotFound("Post not found".to_string()));
    }

    let service = CommentService::new((**pool).clone());
    let comments = service.get_post_comments(post_id).await?;

    let body: Vec<CommentResponse> = comments
        .into_iter()
        .map(|c| CommentResponse::from_comment(c, &renderer))
        .collect();

    Ok(HttpResponse::Ok().json(body))
}

/// Create a new comment on a post
pub async fn create_comment(
    pool: web::Data<PgPool>,
    renderer: web::Data<MarkdownRenderer>,
    user_id: UserId,
    req: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    // A nonexistent post is a field-level validation failure, matching
    // the behavior clients already depend on.
    let posts = PostService::new((**pool).clone());
    if !posts.post_exists(req.post_id).await? {
        return Err(unknown_post_error());
    }

    let service = CommentService::new((**pool).clone());
    let comment = service
        .create_comment(req.post_id, user_id.0, &req.content)
        .await?;

    Ok(HttpResponse::Created().json(CommentResponse::from_comment(comment, &renderer)))
}

/// Get a single comment
pub async fn get_comment(
    pool: web::Data<PgPool>,
    renderer: web::Data<MarkdownRenderer>,
    comment_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let service = CommentService::new((**pool).clone());
    let comment = service
        .get_comment(*comment_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

    Ok(HttpResponse::Ok().json(CommentResponse::from_comment(comment, &renderer)))
}

/// Update a comment (comment author only)
pub async fn update_comment(
    pool: web::Data<PgPool>,
    renderer: web::Data<MarkdownRenderer>,
    comment_id: web::Path<Uuid>,
    user_id: UserId,
    req: web::Json<UpdateCommentRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let service = CommentService::new((**pool).clone());
    let comment = service
        .get_comment(*comment_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

    permissions::check_write(&Identity::Authenticated(user_id.0), &comment.ownership())?;

    let updated = service
        .update_comment(*comment_id, &req.content)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

    Ok(HttpResponse::Ok().json(CommentResponse::from_comment(updated, &renderer)))
}

/// Delete a comment (comment author, or the author of the post it is on)
pub async fn delete_comment(
    pool: web::Data<PgPool>,
    comment_id: web::Path<Uuid>,
    user_id: UserId,
) -> Result<HttpResponse> {
    let service = CommentService::new((**pool).clone());
    let comment = service
        .get_comment(*comment_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

    permissions::check_delete(&Identity::Authenticated(user_id.0), &comment.ownership())?;

    service.delete_comment(*comment_id).await?;

    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_post_is_a_field_error() {
        let err = unknown_post_error();
        match err {
            AppError::Validation(errors) => {
                let fields = errors.field_errors();
                assert!(fields.contains_key("post_id"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_update_request_rejects_blank_content() {
        let req = UpdateCommentRequest {
            content: String::new(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_comment_response_renders_html() {
        let renderer = MarkdownRenderer::new();
        let comment = Comment {
            id: Uuid::new_v4(),
            post_id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            author_username: "commenter".to_string(),
            post_author_id: Uuid::new_v4(),
            content: "*nice* post".to_string(),
            created_date: Utc::now(),
            updated_date: Utc::now(),
        };

        let response = CommentResponse::from_comment(comment, &renderer);
        assert!(response.content_html.contains("<em>nice</em>"));
        assert_eq!(response.content, "*nice* post");
    }
}
