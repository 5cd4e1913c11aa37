use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::User;

/// A login session, persisted next to the users it points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub sid: String,
    pub user_id: i32,
    pub username: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Start a session for `user` that lives for `ttl`.
    pub fn new(user: &User, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sid: Uuid::new_v4().simple().to_string(),
            user_id: user.id,
            username: user.username.clone(),
            expires_at: now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
            created_at: now,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
