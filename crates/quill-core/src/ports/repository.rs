use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Category, Comment, Location, Post, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// Narrowing applied on top of the visibility filter for post listings.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub category_slug: Option<String>,
    pub author_id: Option<Uuid>,
}

impl PostFilter {
    pub fn in_category(slug: impl Into<String>) -> Self {
        Self {
            category_slug: Some(slug.into()),
            ..Self::default()
        }
    }

    pub fn by_author(author_id: Uuid) -> Self {
        Self {
            author_id: Some(author_id),
            ..Self::default()
        }
    }
}

/// Post repository.
///
/// The `*_visible` queries compose the visibility rule in the store: post
/// published, category published, `pub_date <= now`. Results are ordered
/// newest `created_at` first with id as deterministic tie-break.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    async fn count_visible(&self, filter: &PostFilter, now: DateTime<Utc>)
    -> Result<u64, RepoError>;

    async fn list_visible(
        &self,
        filter: &PostFilter,
        now: DateTime<Utc>,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Post>, RepoError>;
}

/// Category repository.
#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, Uuid> {
    /// Slug lookup for the category page. An unpublished category is a miss.
    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError>;
}

/// Location repository; posts only ever resolve locations by id.
pub trait LocationRepository: BaseRepository<Location, Uuid> {}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Comments under a post, oldest first.
    async fn list_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError>;
}

/// User repository with domain-specific lookups.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
}
