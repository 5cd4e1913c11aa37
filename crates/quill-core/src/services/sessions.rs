use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::domain::{Session, User};
use crate::error::DomainError;
use crate::ports::SessionStore;

/// Login sessions on top of a `SessionStore`.
#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn SessionStore>,
    ttl: Duration,
}

impl SessionService {
    pub fn new(store: Arc<dyn SessionStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Start and persist a session for `user`.
    pub async fn open(&self, user: &User) -> Result<Session, DomainError> {
        let session = Session::new(user, self.ttl);
        self.store.save(&session).await?;
        Ok(session)
    }

    /// Look up a live session. Expired ones are removed on sight.
    pub async fn resolve(&self, sid: &str) -> Result<Option<Session>, DomainError> {
        let Some(session) = self.store.load(sid).await? else {
            return Ok(None);
        };

        if session.is_expired_at(Utc::now()) {
            self.store.destroy(sid).await?;
            return Ok(None);
        }

        Ok(Some(session))
    }

    /// End a session. Returns whether it existed.
    pub async fn close(&self, sid: &str) -> Result<bool, DomainError> {
        Ok(self.store.destroy(sid).await?)
    }

    pub async fn purge_expired(&self) -> Result<u64, DomainError> {
        Ok(self.store.purge_expired(Utc::now()).await?)
    }
}
