//! In-memory storage - used when no database is configured, and in tests.
//!
//! Mirrors the relational constraints of the real schema: unique emails,
//! posts and sessions must reference an existing user, and deleting a user
//! cascades to both. Data is lost on process restart.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use quill_core::domain::{
    NewPost, NewUserRecord, Post, PostChanges, Session, User, UserRecordChanges,
};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, PostRepository, SessionStore, UserRepository};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i32, User>,
    posts: BTreeMap<i32, Post>,
    sessions: HashMap<String, Session>,
    last_user_id: i32,
    last_post_id: i32,
}

impl Tables {
    fn email_taken(&self, email: &str, except: Option<i32>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }

    fn posts_of(&self, user_id: i32) -> Vec<Post> {
        newest_first(
            self.posts
                .values()
                .filter(|p| p.user_id == user_id)
                .cloned()
                .collect(),
        )
    }
}

fn newest_first(mut posts: Vec<Post>) -> Vec<Post> {
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    posts
}

/// Handle to one set of in-memory tables. Clones share the data.
#[derive(Clone, Default)]
pub struct InMemoryDatabase {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn users(&self) -> InMemoryUserRepository {
        InMemoryUserRepository {
            tables: Arc::clone(&self.tables),
        }
    }

    pub fn posts(&self) -> InMemoryPostRepository {
        InMemoryPostRepository {
            tables: Arc::clone(&self.tables),
        }
    }

    pub fn sessions(&self) -> InMemorySessionStore {
        InMemorySessionStore {
            tables: Arc::clone(&self.tables),
        }
    }
}

pub struct InMemoryUserRepository {
    tables: Arc<RwLock<Tables>>,
}

#[async_trait]
impl BaseRepository<User, i32> for InMemoryUserRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, RepoError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn delete(&self, id: i32) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }

        tables.posts.retain(|_, p| p.user_id != id);
        tables.sessions.retain(|_, s| s.user_id != id);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: NewUserRecord) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.email_taken(&user.email, None) {
            return Err(RepoError::Duplicate("users.email".to_string()));
        }

        tables.last_user_id += 1;
        let user = User {
            id: tables.last_user_id,
            username: user.username,
            email: user.email,
            password_hash: user.password.into_string(),
            created_at: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, id: i32, changes: UserRecordChanges) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if let Some(email) = &changes.email {
            if tables.email_taken(email, Some(id)) {
                return Err(RepoError::Duplicate("users.email".to_string()));
            }
        }

        let user = tables.users.get_mut(&id).ok_or(RepoError::NotFound)?;
        if let Some(username) = changes.username {
            user.username = username;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(password) = changes.password {
            user.password_hash = password.into_string();
        }
        Ok(user.clone())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_with_posts(&self, id: i32) -> Result<Option<(User, Vec<Post>)>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .get(&id)
            .map(|user| (user.clone(), tables.posts_of(id))))
    }
}

pub struct InMemoryPostRepository {
    tables: Arc<RwLock<Tables>>,
}

#[async_trait]
impl BaseRepository<Post, i32> for InMemoryPostRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<Post>, RepoError> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn delete(&self, id: i32) -> Result<(), RepoError> {
        match self.tables.write().await.posts.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn insert(&self, user_id: i32, post: NewPost) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user_id) {
            return Err(RepoError::ForeignKey("posts.user_id".to_string()));
        }

        tables.last_post_id += 1;
        let now = Utc::now();
        let post = Post {
            id: tables.last_post_id,
            user_id,
            title: post.title,
            content: post.content,
            created_at: now,
            updated_at: now,
        };
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, id: i32, changes: PostChanges) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        let post = tables.posts.get_mut(&id).ok_or(RepoError::NotFound)?;
        if let Some(title) = changes.title {
            post.title = title;
        }
        if let Some(content) = changes.content {
            post.content = content;
        }
        post.updated_at = Utc::now();
        Ok(post.clone())
    }

    async fn find_by_user_id(&self, user_id: i32) -> Result<Vec<Post>, RepoError> {
        Ok(self.tables.read().await.posts_of(user_id))
    }

    async fn find_all(&self) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(newest_first(tables.posts.values().cloned().collect()))
    }

    async fn find_with_author(&self, id: i32) -> Result<Option<(Post, Option<User>)>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.get(&id).map(|post| {
            let author = tables.users.get(&post.user_id).cloned();
            (post.clone(), author)
        }))
    }
}

pub struct InMemorySessionStore {
    tables: Arc<RwLock<Tables>>,
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, sid: &str) -> Result<Option<Session>, RepoError> {
        Ok(self.tables.read().await.sessions.get(sid).cloned())
    }

    async fn save(&self, session: &Session) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&session.user_id) {
            return Err(RepoError::ForeignKey("sessions.user_id".to_string()));
        }
        tables.sessions.insert(session.sid.clone(), session.clone());
        Ok(())
    }

    async fn destroy(&self, sid: &str) -> Result<bool, RepoError> {
        Ok(self.tables.write().await.sessions.remove(sid).is_some())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, RepoError> {
        let mut tables = self.tables.write().await;
        let before = tables.sessions.len();
        tables.sessions.retain(|_, s| !s.is_expired_at(now));
        Ok((before - tables.sessions.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use quill_core::domain::PasswordHash;

    use super::*;

    fn record(email: &str) -> NewUserRecord {
        NewUserRecord {
            username: "ada".to_string(),
            email: email.to_string(),
            password: PasswordHash::from_phc("$argon2id$stub".to_string()),
        }
    }

    fn post(title: &str) -> NewPost {
        NewPost {
            title: title.to_string(),
            content: "body".to_string(),
        }
    }

    #[tokio::test]
    async fn assigns_sequential_ids_and_rejects_duplicate_email() {
        let db = InMemoryDatabase::new();
        let users = db.users();

        let first = users.insert(record("ada@x.com")).await.unwrap();
        let second = users.insert(record("bob@x.com")).await.unwrap();
        assert_eq!((first.id, second.id), (1, 2));

        let err = users.insert(record("ada@x.com")).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn post_requires_existing_user() {
        let db = InMemoryDatabase::new();
        let err = db.posts().insert(42, post("orphan")).await.unwrap_err();
        assert!(matches!(err, RepoError::ForeignKey(_)));
    }

    #[tokio::test]
    async fn deleting_user_cascades() {
        let db = InMemoryDatabase::new();
        let ada = db.users().insert(record("ada@x.com")).await.unwrap();
        let bob = db.users().insert(record("bob@x.com")).await.unwrap();
        db.posts().insert(ada.id, post("one")).await.unwrap();
        db.posts().insert(bob.id, post("two")).await.unwrap();
        let session = Session::new(&ada, Duration::hours(1));
        db.sessions().save(&session).await.unwrap();

        db.users().delete(ada.id).await.unwrap();

        let remaining = db.posts().find_all().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].user_id, bob.id);
        assert!(db.sessions().load(&session.sid).await.unwrap().is_none());
        assert!(matches!(
            db.users().delete(ada.id).await,
            Err(RepoError::NotFound)
        ));
    }

    #[tokio::test]
    async fn purge_removes_only_expired_sessions() {
        let db = InMemoryDatabase::new();
        let ada = db.users().insert(record("ada@x.com")).await.unwrap();
        let live = Session::new(&ada, Duration::hours(1));
        let stale = Session::new(&ada, Duration::seconds(-1));
        db.sessions().save(&live).await.unwrap();
        db.sessions().save(&stale).await.unwrap();

        let purged = db.sessions().purge_expired(Utc::now()).await.unwrap();

        assert_eq!(purged, 1);
        assert!(db.sessions().load(&live.sid).await.unwrap().is_some());
    }
}
