//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{
    CategoryRepository, CommentRepository, LocationRepository, PostRepository, UserRepository,
};
use quill_infra::DatabaseConfig;
use quill_infra::database::{
    self, InMemoryCategoryRepository, InMemoryCommentRepository, InMemoryLocationRepository,
    InMemoryPostRepository, InMemoryStore, InMemoryUserRepository, PostgresCategoryRepository,
    PostgresCommentRepository, PostgresLocationRepository, PostgresPostRepository,
    PostgresUserRepository,
};

/// Shared application state: one repository per entity.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub locations: Arc<dyn LocationRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
}

impl AppState {
    /// Build the application state against the configured backend.
    pub async fn new(db_config: Option<&DatabaseConfig>) -> Self {
        let state = match db_config {
            Some(config) => match database::connect(config).await {
                Ok(conn) => Self {
                    users: Arc::new(PostgresUserRepository::new(conn.clone())),
                    categories: Arc::new(PostgresCategoryRepository::new(conn.clone())),
                    locations: Arc::new(PostgresLocationRepository::new(conn.clone())),
                    posts: Arc::new(PostgresPostRepository::new(conn.clone())),
                    comments: Arc::new(PostgresCommentRepository::new(conn)),
                },
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                    Self::in_memory()
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                Self::in_memory()
            }
        };

        tracing::info!("Application state initialized");
        state
    }

    /// Repositories over one shared in-memory store.
    pub fn in_memory() -> Self {
        let store = InMemoryStore::new();
        Self {
            users: Arc::new(InMemoryUserRepository::new(store.clone())),
            categories: Arc::new(InMemoryCategoryRepository::new(store.clone())),
            locations: Arc::new(InMemoryLocationRepository::new(store.clone())),
            posts: Arc::new(InMemoryPostRepository::new(store.clone())),
            comments: Arc::new(InMemoryCommentRepository::new(store)),
        }
    }
}
