//! Storage for users, posts and sessions.

mod memory;

pub use memory::{InMemoryDatabase, InMemoryPostRepository, InMemorySessionStore, InMemoryUserRepository};

#[cfg(feature = "postgres")]
mod connections;
#[cfg(feature = "postgres")]
mod postgres_base;
#[cfg(feature = "postgres")]
mod postgres_repo;

#[cfg(feature = "postgres")]
pub mod entity;

#[cfg(feature = "postgres")]
pub use connections::{DatabaseConfig, connect};

#[cfg(feature = "postgres")]
pub use postgres_repo::{PostgresPostRepository, PostgresSessionStore, PostgresUserRepository};

#[cfg(feature = "postgres")]
#[cfg(test)]
mod tests;
