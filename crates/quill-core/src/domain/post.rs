use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Post entity - one blog entry owned by a single author.
///
/// `category_id` and `location_id` are plain reference fields; the referenced
/// rows are resolved through an explicit repository lookup at the point of
/// use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    /// Moment the post goes public. Future-dated posts stay hidden from
    /// listings and detail fetches until this passes.
    pub pub_date: DateTime<Utc>,
    pub is_published: bool,
    pub author_id: Uuid,
    pub category_id: Uuid,
    pub location_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new published post owned by `author_id`.
    pub fn new(
        author_id: Uuid,
        category_id: Uuid,
        location_id: Option<Uuid>,
        title: String,
        body: String,
        pub_date: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            body,
            pub_date,
            is_published: true,
            author_id,
            category_id,
            location_id,
            created_at: now,
            updated_at: now,
        }
    }
}
