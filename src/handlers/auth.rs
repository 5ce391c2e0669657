/// Auth handlers - signup, login, logout, current user, GitHub OAuth
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::middleware::UserId;
use crate::models::User;
use crate::security::password;
use crate::services::{GitHubOAuthService, UserService};
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 3, max = 32, message = "Username must be 3 to 32 characters"))]
    pub username: String,
    #[validate(length(min = 8, max = 128, message = "Password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password may not be blank"))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct GitHubCallbackRequest {
    pub code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

/// Token + profile payload returned by signup, login, and OAuth login
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub key: String,
    pub user: UserProfile,
}

/// Register a new account and issue its token
pub async fn signup(
    pool: web::Data<PgPool>,
    req: web::Json<SignupRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let service = UserService::new((**pool).clone());
    let password_hash = password::hash_password(&req.password)?;
    let user = service
        .create_user(&req.email, &req.username, &password_hash)
        .await?;
    let key = service.get_or_create_token(user.id).await?;

    Ok(HttpResponse::Created().json(AuthResponse {
        key,
        user: user.into(),
    }))
}

/// Log in with email and password
pub async fn login(pool: web::Data<PgPool>, req: web::Json<LoginRequest>) -> Result<HttpResponse> {
    req.validate()?;

    let service = UserService::new((**pool).clone());
    let user = service
        .find_by_email(&req.email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        return Err(AppError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let key = service.get_or_create_token(user.id).await?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        key,
        user: user.into(),
    }))
}

/// Log out: invalidate the caller's token
pub async fn logout(pool: web::Data<PgPool>, user_id: UserId) -> Result<HttpResponse> {
    let service = UserService::new((**pool).clone());
    service.delete_token(user_id.0).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "detail": "Successfully logged out."
    })))
}

/// Current authenticated user's profile
pub async fn current_user(pool: web::Data<PgPool>, user_id: UserId) -> Result<HttpResponse> {
    let service = UserService::new((**pool).clone());
    let user = service
        .find_by_id(user_id.0)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid token".to_string()))?;

    Ok(HttpResponse::Ok().json(UserProfile::from(user)))
}

/// Handle the GitHub OAuth callback: exchange the code, find or create
/// the user, and hand back a token
pub async fn github_callback(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    http: web::Data<reqwest::Client>,
    req: web::Json<GitHubCallbackRequest>,
) -> Result<HttpResponse> {
    let code = req
        .code
        .as_deref()
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("No code provided".to_string()))?;

    let oauth = GitHubOAuthService::new(
        config.github.clone(),
        (**pool).clone(),
        http.get_ref().clone(),
    );
    let user = oauth.login_with_code(code).await?;

    let service = UserService::new((**pool).clone());
    let key = service.get_or_create_token(user.id).await?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        key,
        user: user.into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_rejects_malformed_email() {
        let req = SignupRequest {
            email: "not-an-email".to_string(),
            username: "someone".to_string(),
            password: "long enough password".to_string(),
        };

        let errors = req.validate().expect_err("bad email must fail");
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_signup_rejects_short_password() {
        let req = SignupRequest {
            email: "user@example.com".to_string(),
            username: "someone".to_string(),
            password: "short".to_string(),
        };

        let errors = req.validate().expect_err("short password must fail");
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn test_signup_accepts_valid_payload() {
        let req = SignupRequest {
            email: "user@example.com".to_string(),
            username: "someone".to_string(),
            password: "long enough password".to_string(),
        };

        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_profile_omits_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            email: "user@example.com".to_string(),
            username: "someone".to_string(),
            password_hash: "secret-hash".to_string(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };

        let json = serde_json::to_string(&UserProfile::from(user)).expect("should serialize");
        assert!(!json.contains("secret-hash"));
        assert!(json.contains("user@example.com"));
    }
}
