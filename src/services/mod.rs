/// Business logic layer for the blog service
///
/// - Post service: post creation, retrieval, updates
/// - Comment service: comment lifecycle
/// - User service: accounts and auth tokens
/// - GitHub OAuth: third-party login exchange
/// - Markdown: render-and-sanitize pipeline for user content
pub mod comments;
pub mod github;
pub mod markdown;
pub mod posts;
pub mod users;

// Re-export commonly used services
pub use comments::CommentService;
pub use github::GitHubOAuthService;
pub use markdown::MarkdownRenderer;
pub use posts::PostService;
pub use users::UserService;
