//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod password;
mod rate_limit;
mod repository;
mod session;

pub use password::{PasswordError, PasswordService};
pub use rate_limit::{RateLimitError, RateLimitResult, RateLimiter};
pub use repository::{BaseRepository, PostRepository, UserRepository};
pub use session::SessionStore;
