use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Comment entity - a reader's note under a post, owned by its author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub body: String,
    pub author_id: Uuid,
    pub post_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Create a new comment bound to `post_id` and owned by `author_id`.
    pub fn new(author_id: Uuid, post_id: Uuid, body: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            body,
            author_id,
            post_id,
            created_at: Utc::now(),
        }
    }
}
