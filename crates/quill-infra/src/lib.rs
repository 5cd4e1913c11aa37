//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external backends, in-memory stores only
//! - `postgres` - PostgreSQL storage via SeaORM
//! - `auth` - Argon2 password hashing
//! - `rate-limit` - Login throttling via governor

pub mod database;

#[cfg(feature = "auth")]
pub mod auth;

#[cfg(feature = "rate-limit")]
pub mod rate_limit;

// Re-exports - In-Memory
pub use database::InMemoryDatabase;

#[cfg(feature = "postgres")]
pub use database::DatabaseConfig;

#[cfg(feature = "auth")]
pub use auth::{Argon2PasswordService, PasswordConfig};

#[cfg(feature = "rate-limit")]
pub use rate_limit::{InMemoryRateLimiter, RateLimitConfig};
