use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Post entity - a blog post owned by exactly one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Post content supplied by the author. The owner comes from the session.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewPost {
    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PostChanges {
    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: Option<String>,
}
