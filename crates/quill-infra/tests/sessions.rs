use std::sync::Arc;

use chrono::{Duration, Utc};

use quill_core::SessionService;
use quill_core::domain::{NewUserRecord, PasswordHash, Session};
use quill_core::ports::{SessionStore, UserRepository};
use quill_infra::InMemoryDatabase;

async fn seeded() -> (InMemoryDatabase, quill_core::domain::User) {
    let db = InMemoryDatabase::new();
    let user = db
        .users()
        .insert(NewUserRecord {
            username: "ada".to_string(),
            email: "ada@x.com".to_string(),
            password: PasswordHash::from_phc("$argon2id$stub".to_string()),
        })
        .await
        .unwrap();
    (db, user)
}

#[tokio::test]
async fn open_resolve_close() {
    let (db, user) = seeded().await;
    let sessions = SessionService::new(Arc::new(db.sessions()), Duration::hours(1));

    let session = sessions.open(&user).await.unwrap();
    let resolved = sessions.resolve(&session.sid).await.unwrap().unwrap();
    assert_eq!(resolved.user_id, user.id);
    assert_eq!(resolved.username, "ada");

    assert!(sessions.close(&session.sid).await.unwrap());
    assert!(!sessions.close(&session.sid).await.unwrap());
    assert!(sessions.resolve(&session.sid).await.unwrap().is_none());
}

#[tokio::test]
async fn expired_session_is_dropped_on_resolve() {
    let (db, user) = seeded().await;
    let store = db.sessions();
    let mut stale = Session::new(&user, Duration::hours(1));
    stale.expires_at = Utc::now() - Duration::seconds(5);
    store.save(&stale).await.unwrap();

    let sessions = SessionService::new(Arc::new(db.sessions()), Duration::hours(1));
    assert!(sessions.resolve(&stale.sid).await.unwrap().is_none());
    assert!(store.load(&stale.sid).await.unwrap().is_none());
}

#[tokio::test]
async fn purge_counts_expired_sessions() {
    let (db, user) = seeded().await;
    let sessions = SessionService::new(Arc::new(db.sessions()), Duration::seconds(-1));
    sessions.open(&user).await.unwrap();
    sessions.open(&user).await.unwrap();

    assert_eq!(sessions.purge_expired().await.unwrap(), 2);
    assert_eq!(sessions.purge_expired().await.unwrap(), 0);
}
