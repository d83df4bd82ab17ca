use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::store::{Collection, Record};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reply {
    pub author: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Forum thread, stored in `posts.json` with its replies inline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForumPost {
    pub id: String,
    pub author: String,
    pub title: String,
    pub course: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub replies: Vec<Reply>,
}

impl Record for ForumPost {
    const COLLECTION: Collection = Collection::Posts;
}

/// Listing row for the forum index.
#[derive(Debug, Serialize)]
pub struct PostSummary {
    pub id: String,
    pub author: String,
    pub title: String,
    pub course: String,
    pub created_at: DateTime<Utc>,
    pub views: u64,
    pub replies_count: usize,
}

impl From<&ForumPost> for PostSummary {
    fn from(p: &ForumPost) -> Self {
        Self {
            id: p.id.clone(),
            author: p.author.clone(),
            title: p.title.clone(),
            course: p.course.clone(),
            created_at: p.created_at,
            views: p.views,
            replies_count: p.replies.len(),
        }
    }
}

/// DTO for creating a new post.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Title length must be between 1 and 100 chars"
    ))]
    pub title: String,

    #[validate(length(min = 1, max = 100))]
    pub course: String,

    #[validate(length(
        min = 1,
        max = 10000,
        message = "Content length must be between 1 and 10000 chars"
    ))]
    pub content: String,
}

/// DTO for replying to a post.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReplyRequest {
    #[validate(length(
        min = 1,
        max = 1000,
        message = "Reply must be between 1 and 1000 characters"
    ))]
    pub content: String,
}

/// Query parameters for listing posts.
#[derive(Debug, Deserialize)]
pub struct PostListParams {
    pub course: Option<String>,

    /// Search keyword for title match.
    pub q: Option<String>,

    /// Number of items to return (default: 20, max: 100).
    pub limit: Option<usize>,
}
