/// HTTP handlers for the blog API
///
/// - Posts: create, read, update, delete, per-user listings
/// - Comments: create, read, update, delete, per-post listings
/// - Auth: signup, login, logout, current user, GitHub OAuth callback
pub mod auth;
pub mod comments;
pub mod posts;

// Re-export handler functions at module level
pub use auth::{current_user, github_callback, login, logout, signup};
pub use comments::{create_comment, delete_comment, get_comment, list_comments, update_comment};
pub use posts::{create_post, delete_post, get_post, get_user_posts, list_posts, update_post};
