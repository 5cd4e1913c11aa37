use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{DbConn, DbErr, EntityTrait, PrimaryKeyTrait, SqlErr};

use quill_core::error::RepoError;
use quill_core::ports::BaseRepository;

/// Generic SeaORM repository over one entity. Repositories share one pool.
pub struct PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    pub(crate) db: Arc<DbConn>,
    _entity: PhantomData<E>,
}

impl<E> PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    pub fn new(db: Arc<DbConn>) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }
}

impl<E> Clone for PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    fn clone(&self) -> Self {
        Self::new(Arc::clone(&self.db))
    }
}

/// Classify a SeaORM error. Constraint violations are recognised by the
/// driver error code, not by message text.
pub(crate) fn repo_error(err: DbErr) -> RepoError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => return RepoError::Duplicate(msg),
        Some(SqlErr::ForeignKeyConstraintViolation(msg)) => return RepoError::ForeignKey(msg),
        _ => {}
    }

    match err {
        DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated => RepoError::NotFound,
        DbErr::Conn(e) => RepoError::Connection(e.to_string()),
        DbErr::ConnectionAcquire(e) => RepoError::Connection(e.to_string()),
        other => RepoError::Query(other.to_string()),
    }
}

#[async_trait]
impl<E, T, ID> BaseRepository<T, ID> for PostgresBaseRepository<E>
where
    E: EntityTrait,
    E::Model: Sync + Send,
    E::PrimaryKey: PrimaryKeyTrait<ValueType = ID>,
    ID: Send + Sync + Into<sea_orm::Value> + Clone + Copy + 'static,
    T: From<E::Model> + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError> {
        let result = E::find_by_id(id).one(&*self.db).await.map_err(repo_error)?;

        Ok(result.map(Into::into))
    }

    async fn delete(&self, id: ID) -> Result<(), RepoError> {
        let result = E::delete_by_id(id)
            .exec(&*self.db)
            .await
            .map_err(repo_error)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}
