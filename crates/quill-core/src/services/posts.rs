use std::sync::Arc;

use crate::domain::{NewPost, Post, PostChanges, User};
use crate::error::{DomainError, RepoError};
use crate::ports::{PostRepository, UserRepository};
use crate::validation;

/// Posts and their association with users.
#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { posts, users }
    }

    /// Create a post owned by `user_id`, which must be the authenticated user.
    pub async fn create_post(&self, user_id: i32, input: NewPost) -> Result<Post, DomainError> {
        validation::check(&input)?;
        self.require_user(user_id).await?;

        self.posts.insert(user_id, input).await.map_err(|e| match e {
            RepoError::ForeignKey(_) => DomainError::user_not_found(user_id),
            other => DomainError::Storage(other),
        })
    }

    /// Every post created with this `user_id`, newest first.
    pub async fn posts_by_user(&self, user_id: i32) -> Result<Vec<Post>, DomainError> {
        self.require_user(user_id).await?;
        Ok(self.posts.find_by_user_id(user_id).await?)
    }

    /// The user whose id equals `post.user_id`.
    pub async fn user_of(&self, post: &Post) -> Result<User, DomainError> {
        self.require_user(post.user_id).await
    }

    pub async fn list_posts(&self) -> Result<Vec<Post>, DomainError> {
        Ok(self.posts.find_all().await?)
    }

    pub async fn get_post(&self, id: i32) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or(DomainError::post_not_found(id))
    }

    pub async fn get_post_with_author(&self, id: i32) -> Result<(Post, User), DomainError> {
        let (post, author) = self
            .posts
            .find_with_author(id)
            .await?
            .ok_or(DomainError::post_not_found(id))?;
        let author = author.ok_or(DomainError::user_not_found(post.user_id))?;
        Ok((post, author))
    }

    /// Edit a post. Only its owner may.
    pub async fn update_post(
        &self,
        actor_id: i32,
        id: i32,
        changes: PostChanges,
    ) -> Result<Post, DomainError> {
        validation::check(&changes)?;
        let post = self.owned_post(actor_id, id).await?;

        if changes.title.is_none() && changes.content.is_none() {
            return Ok(post);
        }

        self.posts.update(id, changes).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::post_not_found(id),
            other => DomainError::Storage(other),
        })
    }

    pub async fn delete_post(&self, actor_id: i32, id: i32) -> Result<(), DomainError> {
        self.owned_post(actor_id, id).await?;

        self.posts.delete(id).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::post_not_found(id),
            other => DomainError::Storage(other),
        })
    }

    async fn owned_post(&self, actor_id: i32, id: i32) -> Result<Post, DomainError> {
        let post = self.get_post(id).await?;
        if post.user_id != actor_id {
            return Err(DomainError::Unauthorized);
        }
        Ok(post)
    }

    async fn require_user(&self, user_id: i32) -> Result<User, DomainError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::user_not_found(user_id))
    }
}
