//! Data Transfer Objects - request/response types for the API.
//!
//! Enumerated fields (role, access level, status) travel as strings and are
//! parsed into the closed domain enums at the handler boundary.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to register a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    /// "reader" (default) or "author".
    pub role: Option<String>,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response containing authentication tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// A user's public information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: String,
    pub created_at: String,
}

/// Request to create a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub body: String,
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// "free" (default) or "premium".
    pub access_level: Option<String>,
    /// "published" (default) or "draft".
    pub status: Option<String>,
}

/// Request to update a post; omitted fields stay unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub access_level: Option<String>,
    pub status: Option<String>,
}

/// One row of the post list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub author_id: Uuid,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub access_level: String,
    pub publish_date: String,
    pub view_count: u32,
}

/// Paginated post list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostListResponse {
    pub posts: Vec<PostSummary>,
    pub page: u64,
}

/// The post detail page. `body` is already entitlement-filtered: when
/// `paywall` is true it holds the preview and the client renders an upsell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetailResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub author_id: Uuid,
    pub body: String,
    pub paywall: bool,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub access_level: String,
    pub status: String,
    pub publish_date: String,
    pub view_count: u32,
    pub like_count: u64,
    pub liked_by_viewer: bool,
    pub comments: Vec<CommentNode>,
}

/// A comment and its replies, as rendered on the detail page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentNode {
    pub id: Uuid,
    pub author: String,
    pub body: String,
    pub parent_id: Option<Uuid>,
    pub created_date: String,
    pub replies: Vec<CommentNode>,
}

/// Request to add a comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCommentRequest {
    pub body: String,
    pub parent_id: Option<Uuid>,
}

/// A newly created comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author: String,
    pub body: String,
    pub parent_id: Option<Uuid>,
    pub created_date: String,
}

/// Result of a like toggle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikeResponse {
    pub liked: bool,
    pub count: u64,
}

/// Subscription state, liveness derived from the end date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionResponse {
    pub active: bool,
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
