//! Database connection management and repository implementations.

mod connections;
mod postgres_base;

pub mod entity;
pub mod memory;
pub mod postgres_repo;

pub use connections::{DatabaseConfig, connect};
pub use memory::{
    InMemoryCategoryRepository, InMemoryCommentRepository, InMemoryLocationRepository,
    InMemoryPostRepository, InMemoryStore, InMemoryUserRepository,
};
pub use postgres_repo::{
    PostgresCategoryRepository, PostgresCommentRepository, PostgresLocationRepository,
    PostgresPostRepository, PostgresUserRepository,
};

#[cfg(test)]
mod tests;
