use std::sync::Arc;

use chrono::{Duration, Utc};
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

use quill_core::domain::{NewPost, NewUserRecord, PasswordHash, Post, Session, User};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, PostRepository, SessionStore, UserRepository};

use super::entity::{post, session, user};
use super::postgres_repo::{PostgresPostRepository, PostgresSessionStore, PostgresUserRepository};

fn user_model(id: i32, email: &str) -> user::Model {
    user::Model {
        id,
        username: "ada".to_owned(),
        email: email.to_owned(),
        password: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_owned(),
        created_at: Utc::now().into(),
    }
}

fn post_model(id: i32, user_id: i32, title: &str) -> post::Model {
    let now = Utc::now();
    post::Model {
        id,
        user_id,
        title: title.to_owned(),
        content: "Content".to_owned(),
        created_at: now.into(),
        updated_at: now.into(),
    }
}

#[tokio::test]
async fn test_find_post_by_id() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_model(5, 1, "Test Post")]])
        .into_connection();

    let repo = PostgresPostRepository::new(Arc::new(db));

    let result: Option<Post> = repo.find_by_id(5).await.unwrap();

    let post = result.unwrap();
    assert_eq!(post.title, "Test Post");
    assert_eq!(post.id, 5);
    assert_eq!(post.user_id, 1);
}

#[tokio::test]
async fn insert_user_returns_stored_row() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user_model(1, "ada@x.com")]])
        .append_exec_results([MockExecResult {
            last_insert_id: 1,
            rows_affected: 1,
        }])
        .into_connection();

    let repo = PostgresUserRepository::new(Arc::new(db));
    let user = repo
        .insert(NewUserRecord {
            username: "ada".to_owned(),
            email: "ada@x.com".to_owned(),
            password: PasswordHash::from_phc(
                "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_owned(),
            ),
        })
        .await
        .unwrap();

    assert_eq!(user.id, 1);
    assert!(user.password_hash.starts_with("$argon2id$"));
}

#[tokio::test]
async fn find_user_by_email() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user_model(3, "ada@x.com")], vec![]])
        .into_connection();

    let repo = PostgresUserRepository::new(Arc::new(db));

    let found = repo.find_by_email("ada@x.com").await.unwrap();
    assert_eq!(found.map(|u| u.id), Some(3));

    let missing = repo.find_by_email("nobody@x.com").await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn find_posts_by_user_id() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_model(2, 7, "second"), post_model(1, 7, "first")]])
        .into_connection();

    let repo = PostgresPostRepository::new(Arc::new(db));
    let posts = repo.find_by_user_id(7).await.unwrap();

    assert_eq!(posts.len(), 2);
    assert!(posts.iter().all(|p| p.user_id == 7));
}

#[tokio::test]
async fn delete_missing_user_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresUserRepository::new(Arc::new(db));
    let err = BaseRepository::<User, i32>::delete(&repo, 99)
        .await
        .unwrap_err();

    assert!(matches!(err, RepoError::NotFound));
}

#[tokio::test]
async fn insert_post_maps_rows() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_model(10, 1, "Hello")]])
        .append_exec_results([MockExecResult {
            last_insert_id: 10,
            rows_affected: 1,
        }])
        .into_connection();

    let repo = PostgresPostRepository::new(Arc::new(db));
    let post = repo
        .insert(
            1,
            NewPost {
                title: "Hello".to_owned(),
                content: "Content".to_owned(),
            },
        )
        .await
        .unwrap();

    assert_eq!(post.id, 10);
    assert_eq!(post.user_id, 1);
}

#[tokio::test]
async fn load_session_by_sid() {
    let now = Utc::now();
    let model = session::Model {
        sid: "abc123".to_owned(),
        user_id: 1,
        username: "ada".to_owned(),
        expires_at: (now + Duration::hours(1)).into(),
        created_at: now.into(),
    };
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![model]])
        .into_connection();

    let store = PostgresSessionStore::new(Arc::new(db));
    let session: Session = store.load("abc123").await.unwrap().unwrap();

    assert_eq!(session.user_id, 1);
    assert!(!session.is_expired_at(now));
}

#[tokio::test]
async fn purge_reports_deleted_rows() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 4,
        }])
        .into_connection();

    let store = PostgresSessionStore::new(Arc::new(db));
    assert_eq!(store.purge_expired(Utc::now()).await.unwrap(), 4);
}

#[tokio::test]
async fn repositories_share_one_pool() {
    let db = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_model(7, "ada@x.com")]])
            .append_query_results([vec![post_model(1, 7, "first")]])
            .into_connection(),
    );

    let users = PostgresUserRepository::new(Arc::clone(&db));
    let posts = PostgresPostRepository::new(Arc::clone(&db));

    let ada = users.find_by_email("ada@x.com").await.unwrap().unwrap();
    let theirs = posts.find_by_user_id(ada.id).await.unwrap();

    assert_eq!(theirs.len(), 1);
    assert_eq!(theirs[0].user_id, 7);
    assert_eq!(Arc::strong_count(&db), 3);
}
