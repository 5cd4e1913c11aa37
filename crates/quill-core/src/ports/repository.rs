use async_trait::async_trait;

use crate::domain::{NewPost, NewUserRecord, Post, PostChanges, User, UserRecordChanges};
use crate::error::RepoError;

/// Lookups and deletes shared by every table.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Delete an entity by its ID. `RepoError::NotFound` if nothing was deleted.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository. Only hashed passwords get in.
#[async_trait]
pub trait UserRepository: BaseRepository<User, i32> {
    /// Insert a new user. `RepoError::Duplicate` when the email is taken.
    async fn insert(&self, user: NewUserRecord) -> Result<User, RepoError>;

    /// Apply a partial update in a single statement.
    async fn update(&self, id: i32, changes: UserRecordChanges) -> Result<User, RepoError>;

    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// A user together with every post they own.
    async fn find_with_posts(&self, id: i32) -> Result<Option<(User, Vec<Post>)>, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, i32> {
    /// Insert a post for `user_id`. `RepoError::ForeignKey` when the user is missing.
    async fn insert(&self, user_id: i32, post: NewPost) -> Result<Post, RepoError>;

    async fn update(&self, id: i32, changes: PostChanges) -> Result<Post, RepoError>;

    /// All posts of one user, newest first.
    async fn find_by_user_id(&self, user_id: i32) -> Result<Vec<Post>, RepoError>;

    /// All posts, newest first.
    async fn find_all(&self) -> Result<Vec<Post>, RepoError>;

    /// A post and its owner, following the `user_id` relation.
    async fn find_with_author(&self, id: i32) -> Result<Option<(Post, Option<User>)>, RepoError>;
}
