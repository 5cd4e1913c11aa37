use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::Session;
use crate::error::RepoError;

/// Session records keyed by session id.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load a session, expired or not.
    async fn load(&self, sid: &str) -> Result<Option<Session>, RepoError>;

    /// Insert or replace a session.
    async fn save(&self, session: &Session) -> Result<(), RepoError>;

    /// Remove a session. Returns whether one existed.
    async fn destroy(&self, sid: &str) -> Result<bool, RepoError>;

    /// Remove every session that expired at or before `now`.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, RepoError>;
}
