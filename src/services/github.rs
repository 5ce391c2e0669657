/// GitHub OAuth login
///
/// One-shot exchange: authorization code -> access token -> user profile
/// (-> email list when the profile email is private) -> local user keyed
/// by email. No retries; any failing step surfaces as an upstream error
/// with a short human-readable summary.
use crate::config::GitHubConfig;
use crate::error::{AppError, Result};
use crate::models::User;
use crate::security::password;
use crate::services::UserService;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

const GITHUB_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const GITHUB_USER_URL: &str = "https://api.github.com/user";
const GITHUB_EMAILS_URL: &str = "https://api.github.com/user/emails";

/// OAuth service for GitHub social login
pub struct GitHubOAuthService {
    config: GitHubConfig,
    db: sqlx::PgPool,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    access_token: Option<String>,
    error: Option<String>,
}

/// GitHub profile fields the exchange consumes
#[derive(Debug, Deserialize)]
pub struct GitHubProfile {
    pub login: String,
    pub email: Option<String>,
}

/// Entry of the authenticated user's email list
#[derive(Debug, Deserialize)]
pub struct GitHubEmail {
    pub email: String,
    pub primary: bool,
}

/// Pick the primary address out of the account's email list.
pub fn select_primary_email(emails: &[GitHubEmail]) -> Option<&str> {
    emails
        .iter()
        .find(|e| e.primary)
        .map(|e| e.email.as_str())
}

impl GitHubOAuthService {
    pub fn new(config: GitHubConfig, db: sqlx::PgPool, http: Client) -> Self {
        Self { config, db, http }
    }

    /// Complete the login flow for an authorization code, returning the
    /// local user (created or existing).
    pub async fn login_with_code(&self, code: &str) -> Result<User> {
        let access_token = self.exchange_code(code).await?;
        let profile = self.fetch_profile(&access_token).await?;

        let email = match profile.email.as_deref() {
            Some(email) if !email.is_empty() => email.to_string(),
            _ => self.resolve_private_email(&access_token, &profile.login).await?,
        };

        self.find_or_create_user(&profile.login, &email).await
    }

    /// Exchange the authorization code for an access token
    async fn exchange_code(&self, code: &str) -> Result<String> {
        let client_id = self.config.client_id.as_deref().ok_or_else(|| {
            AppError::Upstream("GitHub client ID not configured".to_string())
        })?;
        let client_secret = self.config.client_secret.as_deref().ok_or_else(|| {
            AppError::Upstream("GitHub client secret not configured".to_string())
        })?;

        let response = self
            .http
            .post(GITHUB_TOKEN_URL)
            .header("Accept", "application/json")
            .form(&[
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("code", code),
            ])
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("GitHub token request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| AppError::Upstream(format!("GitHub token request failed: {}", e)))?
            .json::<AccessTokenResponse>()
            .await
            .map_err(|e| AppError::Upstream(format!("GitHub token response invalid: {}", e)))?;

        if let Some(error) = response.error {
            return Err(AppError::Upstream(format!(
                "GitHub returned an error: {}",
                error
            )));
        }

        response
            .access_token
            .ok_or_else(|| AppError::Upstream("No access token in GitHub response".to_string()))
    }

    /// Fetch the authenticated user's profile
    async fn fetch_profile(&self, access_token: &str) -> Result<GitHubProfile> {
        self.http
            .get(GITHUB_USER_URL)
            .header("Accept", "application/json")
            .header("Authorization", format!("token {}", access_token))
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("GitHub user request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| AppError::Upstream(format!("GitHub user request failed: {}", e)))?
            .json::<GitHubProfile>()
            .await
            .map_err(|e| AppError::Upstream(format!("GitHub user response invalid: {}", e)))
    }

    /// Resolve a private profile email via the emails endpoint, falling
    /// back to a synthetic address when nothing usable comes back.
    async fn resolve_private_email(&self, access_token: &str, login: &str) -> Result<String> {
        let emails = match self.fetch_emails(access_token).await {
            Ok(emails) => emails,
            Err(e) => {
                warn!("GitHub email lookup failed, using fallback address: {}", e);
                Vec::new()
            }
        };

        Ok(select_primary_email(&emails)
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}@github.user", login)))
    }

    async fn fetch_emails(&self, access_token: &str) -> Result<Vec<GitHubEmail>> {
        self.http
            .get(GITHUB_EMAILS_URL)
            .header("Accept", "application/json")
            .header("Authorization", format!("token {}", access_token))
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("GitHub emails request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| AppError::Upstream(format!("GitHub emails request failed: {}", e)))?
            .json::<Vec<GitHubEmail>>()
            .await
            .map_err(|e| AppError::Upstream(format!("GitHub emails response invalid: {}", e)))
    }

    /// Find the local user by email or create one; keep the stored
    /// username in sync with the GitHub login.
    async fn find_or_create_user(&self, login: &str, email: &str) -> Result<User> {
        let users = UserService::new(self.db.clone());

        if let Some(user) = users.find_by_email(email).await? {
            if user.username != login {
                let updated = users.update_username(user.id, login).await?;
                info!(user_id = %updated.id, "GitHub login refreshed stored username");
                return Ok(updated);
            }
            return Ok(user);
        }

        // New account: the password is random and never communicated, so
        // the account is only reachable through OAuth.
        let password_hash = password::hash_password(&Uuid::new_v4().to_string())?;
        let user = users.create_user(email, login, &password_hash).await?;
        info!(user_id = %user.id, "New user created via GitHub OAuth");

        Ok(user)
    }
}
