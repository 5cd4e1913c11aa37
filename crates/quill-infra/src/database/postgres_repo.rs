//! PostgreSQL repository implementations.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveModelTrait, ColumnTrait, DbConn, EntityTrait, QueryFilter, QueryOrder};

use quill_core::domain::{
    NewPost, NewUserRecord, Post, PostChanges, Session, User, UserRecordChanges,
};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, PostRepository, SessionStore, UserRepository};

use super::entity::post::{self, Entity as PostEntity};
use super::entity::session::{self, Entity as SessionEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, repo_error};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// Keep PII out of the logs.
fn mask_email(email: &str) -> String {
    match email.find('@') {
        Some(at_pos) => {
            let (local, domain) = email.split_at(at_pos);
            let masked_local = match local.chars().next() {
                Some(first) if local.chars().count() > 1 => format!("{first}***"),
                _ => "***".to_string(),
            };
            format!("{masked_local}{domain}")
        }
        None => "***".to_string(),
    }
}

fn newest_first(mut posts: Vec<Post>) -> Vec<Post> {
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    posts
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn insert(&self, user: NewUserRecord) -> Result<User, RepoError> {
        tracing::debug!(user_email = %mask_email(&user.email), "Inserting user");

        let model = user::ActiveModel::from(user)
            .insert(&*self.db)
            .await
            .map_err(repo_error)?;

        Ok(model.into())
    }

    async fn update(&self, id: i32, changes: UserRecordChanges) -> Result<User, RepoError> {
        if changes.username.is_none() && changes.email.is_none() && changes.password.is_none() {
            return BaseRepository::<User, i32>::find_by_id(self, id)
                .await?
                .ok_or(RepoError::NotFound);
        }

        tracing::debug!(user_id = id, "Updating user");

        let model = user::ActiveModel::changes(id, changes)
            .update(&*self.db)
            .await
            .map_err(repo_error)?;

        Ok(model.into())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&*self.db)
            .await
            .map_err(repo_error)?;

        Ok(result.map(Into::into))
    }

    async fn find_with_posts(&self, id: i32) -> Result<Option<(User, Vec<Post>)>, RepoError> {
        let mut rows = UserEntity::find_by_id(id)
            .find_with_related(PostEntity)
            .all(&*self.db)
            .await
            .map_err(repo_error)?;

        Ok(rows.pop().map(|(user, posts)| {
            let posts = posts.into_iter().map(Into::into).collect();
            (user.into(), newest_first(posts))
        }))
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn insert(&self, user_id: i32, post: NewPost) -> Result<Post, RepoError> {
        let model = post::ActiveModel::for_user(user_id, post)
            .insert(&*self.db)
            .await
            .map_err(repo_error)?;

        tracing::debug!(post_id = model.id, user_id, "Post created");
        Ok(model.into())
    }

    async fn update(&self, id: i32, changes: PostChanges) -> Result<Post, RepoError> {
        let model = post::ActiveModel::changes(id, changes)
            .update(&*self.db)
            .await
            .map_err(repo_error)?;

        Ok(model.into())
    }

    async fn find_by_user_id(&self, user_id: i32) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::UserId.eq(user_id))
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .all(&*self.db)
            .await
            .map_err(repo_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_all(&self) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .all(&*self.db)
            .await
            .map_err(repo_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_with_author(&self, id: i32) -> Result<Option<(Post, Option<User>)>, RepoError> {
        let result = PostEntity::find_by_id(id)
            .find_also_related(UserEntity)
            .one(&*self.db)
            .await
            .map_err(repo_error)?;

        Ok(result.map(|(post, user)| (post.into(), user.map(Into::into))))
    }
}

/// Sessions stored in the application database.
#[derive(Clone)]
pub struct PostgresSessionStore {
    db: Arc<DbConn>,
}

impl PostgresSessionStore {
    pub fn new(db: Arc<DbConn>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionStore for PostgresSessionStore {
    async fn load(&self, sid: &str) -> Result<Option<Session>, RepoError> {
        let result = SessionEntity::find_by_id(sid.to_owned())
            .one(&*self.db)
            .await
            .map_err(repo_error)?;

        Ok(result.map(Into::into))
    }

    async fn save(&self, session: &Session) -> Result<(), RepoError> {
        let upsert = OnConflict::column(session::Column::Sid)
            .update_columns([
                session::Column::UserId,
                session::Column::Username,
                session::Column::ExpiresAt,
            ])
            .to_owned();

        SessionEntity::insert(session::ActiveModel::from(session))
            .on_conflict(upsert)
            .exec(&*self.db)
            .await
            .map_err(repo_error)?;

        Ok(())
    }

    async fn destroy(&self, sid: &str) -> Result<bool, RepoError> {
        let result = SessionEntity::delete_by_id(sid.to_owned())
            .exec(&*self.db)
            .await
            .map_err(repo_error)?;

        Ok(result.rows_affected > 0)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, RepoError> {
        let cutoff: DateTime<FixedOffset> = now.into();
        let result = SessionEntity::delete_many()
            .filter(session::Column::ExpiresAt.lte(cutoff))
            .exec(&*self.db)
            .await
            .map_err(repo_error)?;

        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::mask_email;

    #[test]
    fn masks_local_part() {
        assert_eq!(mask_email("ada@x.com"), "a***@x.com");
        assert_eq!(mask_email("a@x.com"), "***@x.com");
        assert_eq!(mask_email("nobody"), "***");
    }
}
