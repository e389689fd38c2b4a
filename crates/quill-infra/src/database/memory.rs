//! In-memory repositories - used as fallback when no database is configured,
//! and as the backend for handler-level tests.
//!
//! All repositories share one [`InMemoryStore`] so that cross-entity queries
//! (the visibility filter needs the post's category) see a consistent view.
//! Note: data is lost on process restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{Category, Comment, Location, Post, User};
use quill_core::error::RepoError;
use quill_core::ports::{
    BaseRepository, CategoryRepository, CommentRepository, LocationRepository, PostFilter,
    PostRepository, UserRepository,
};

/// Shared backing store behind the in-memory repositories.
#[derive(Default)]
pub struct InMemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    categories: RwLock<HashMap<Uuid, Category>>,
    locations: RwLock<HashMap<Uuid, Location>>,
    posts: RwLock<HashMap<Uuid, Post>>,
    comments: RwLock<HashMap<Uuid, Comment>>,
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

pub struct InMemoryUserRepository {
    store: Arc<InMemoryStore>,
}

impl InMemoryUserRepository {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.store.users.read().await.get(&id).cloned())
    }

    async fn save(&self, entity: User) -> Result<User, RepoError> {
        let mut users = self.store.users.write().await;

        // Mirror the SQL unique constraints on username and email
        let taken = users.values().any(|existing| {
            existing.id != entity.id
                && (existing.username == entity.username || existing.email == entity.email)
        });
        if taken {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }

        users.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.store
            .users
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .store
            .users
            .read()
            .await
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .store
            .users
            .read()
            .await
            .values()
            .find(|user| user.email == email)
            .cloned())
    }
}

pub struct InMemoryCategoryRepository {
    store: Arc<InMemoryStore>,
}

impl InMemoryCategoryRepository {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BaseRepository<Category, Uuid> for InMemoryCategoryRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepoError> {
        Ok(self.store.categories.read().await.get(&id).cloned())
    }

    async fn save(&self, entity: Category) -> Result<Category, RepoError> {
        let mut categories = self.store.categories.write().await;

        let taken = categories
            .values()
            .any(|existing| existing.id != entity.id && existing.slug == entity.slug);
        if taken {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }

        categories.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.store
            .categories
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        Ok(self
            .store
            .categories
            .read()
            .await
            .values()
            .find(|category| category.slug == slug && category.is_published)
            .cloned())
    }
}

pub struct InMemoryLocationRepository {
    store: Arc<InMemoryStore>,
}

impl InMemoryLocationRepository {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BaseRepository<Location, Uuid> for InMemoryLocationRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Location>, RepoError> {
        Ok(self.store.locations.read().await.get(&id).cloned())
    }

    async fn save(&self, entity: Location) -> Result<Location, RepoError> {
        self.store
            .locations
            .write()
            .await
            .insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.store
            .locations
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

impl LocationRepository for InMemoryLocationRepository {}

pub struct InMemoryPostRepository {
    store: Arc<InMemoryStore>,
}

impl InMemoryPostRepository {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }

    /// Visibility filter and ordering, matching the SQL query: newest
    /// `created_at` first, id as tie-break.
    async fn visible(&self, filter: &PostFilter, now: DateTime<Utc>) -> Vec<Post> {
        let categories = self.store.categories.read().await;
        let posts = self.store.posts.read().await;

        let mut rows: Vec<Post> = posts
            .values()
            .filter(|post| post.is_published && post.pub_date <= now)
            .filter(|post| {
                categories
                    .get(&post.category_id)
                    .is_some_and(|category| category.is_published)
            })
            .filter(|post| {
                filter.category_slug.as_deref().is_none_or(|slug| {
                    categories
                        .get(&post.category_id)
                        .is_some_and(|category| category.slug == slug)
                })
            })
            .filter(|post| {
                filter
                    .author_id
                    .is_none_or(|author_id| post.author_id == author_id)
            })
            .cloned()
            .collect();

        rows.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        rows
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.store.posts.read().await.get(&id).cloned())
    }

    async fn save(&self, entity: Post) -> Result<Post, RepoError> {
        self.store
            .posts
            .write()
            .await
            .insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.store
            .posts
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn count_visible(
        &self,
        filter: &PostFilter,
        now: DateTime<Utc>,
    ) -> Result<u64, RepoError> {
        Ok(self.visible(filter, now).await.len() as u64)
    }

    async fn list_visible(
        &self,
        filter: &PostFilter,
        now: DateTime<Utc>,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Post>, RepoError> {
        Ok(self
            .visible(filter, now)
            .await
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }
}

pub struct InMemoryCommentRepository {
    store: Arc<InMemoryStore>,
}

impl InMemoryCommentRepository {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BaseRepository<Comment, Uuid> for InMemoryCommentRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        Ok(self.store.comments.read().await.get(&id).cloned())
    }

    async fn save(&self, entity: Comment) -> Result<Comment, RepoError> {
        self.store
            .comments
            .write()
            .await
            .insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.store
            .comments
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn list_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let mut rows: Vec<Comment> = self
            .store
            .comments
            .read()
            .await
            .values()
            .filter(|comment| comment.post_id == post_id)
            .cloned()
            .collect();

        rows.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(rows)
    }
}
