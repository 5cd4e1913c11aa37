use std::sync::Arc;

use crate::domain::{
    NewUser, NewUserRecord, PasswordHash, Post, User, UserChanges, UserRecordChanges,
    normalize_email,
};
use crate::error::{DomainError, RepoError};
use crate::ports::{PasswordService, UserRepository};
use crate::validation::{self, ValidationError};

/// Registration, credential checks and profile updates.
///
/// `create_user` and `update_user` are the only write paths for users and
/// both run the same pipeline: validate, check email uniqueness, hash,
/// write. A password that is present in an update is always re-hashed.
/// Emails are lowercased before any of it, so uniqueness and login ignore
/// case.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordService>,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserRepository>, passwords: Arc<dyn PasswordService>) -> Self {
        Self { users, passwords }
    }

    pub async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
        let input = input.normalized();
        validation::check(&input)?;

        if self.users.find_by_email(&input.email).await?.is_some() {
            return Err(ValidationError::duplicate_email().into());
        }

        let password = self.hash(input.password).await?;
        let record = NewUserRecord {
            username: input.username,
            email: input.email,
            password,
        };

        self.users.insert(record).await.map_err(|e| match e {
            // lost a race against another registration
            RepoError::Duplicate(_) => ValidationError::duplicate_email().into(),
            other => DomainError::Storage(other),
        })
    }

    pub async fn update_user(&self, id: i32, changes: UserChanges) -> Result<User, DomainError> {
        let changes = changes.normalized();
        validation::check(&changes)?;

        if let Some(email) = &changes.email {
            if let Some(owner) = self.users.find_by_email(email).await? {
                if owner.id != id {
                    return Err(ValidationError::duplicate_email().into());
                }
            }
        }

        if changes.is_empty() {
            return self.find_user(id).await;
        }

        let password = match changes.password {
            Some(plain) => Some(self.hash(plain).await?),
            None => None,
        };
        let record = UserRecordChanges {
            username: changes.username,
            email: changes.email,
            password,
        };

        self.users.update(id, record).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::user_not_found(id),
            RepoError::Duplicate(_) => ValidationError::duplicate_email().into(),
            other => DomainError::Storage(other),
        })
    }

    /// Check a plaintext candidate against a stored hash.
    pub async fn verify(&self, candidate: &str, stored_hash: &str) -> Result<bool, DomainError> {
        let passwords = Arc::clone(&self.passwords);
        let candidate = candidate.to_owned();
        let stored_hash = stored_hash.to_owned();

        let valid = tokio::task::spawn_blocking(move || passwords.verify(&candidate, &stored_hash))
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))??;
        Ok(valid)
    }

    /// Resolve login credentials. Unknown email and wrong password look the
    /// same, in result and in cost: an unknown email still pays for one hash.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Option<User>, DomainError> {
        let Some(user) = self.users.find_by_email(&normalize_email(email)).await? else {
            self.hash(password.to_owned()).await?;
            return Ok(None);
        };

        if self.verify(password, &user.password_hash).await? {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    pub async fn find_user(&self, id: i32) -> Result<User, DomainError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or(DomainError::user_not_found(id))
    }

    pub async fn find_user_with_posts(&self, id: i32) -> Result<(User, Vec<Post>), DomainError> {
        self.users
            .find_with_posts(id)
            .await?
            .ok_or(DomainError::user_not_found(id))
    }

    /// Delete a user. Their posts and sessions go with them.
    pub async fn delete_user(&self, id: i32) -> Result<(), DomainError> {
        self.users.delete(id).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::user_not_found(id),
            other => DomainError::Storage(other),
        })
    }

    async fn hash(&self, password: String) -> Result<PasswordHash, DomainError> {
        let passwords = Arc::clone(&self.passwords);
        let hash = tokio::task::spawn_blocking(move || passwords.hash(&password))
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))??;
        Ok(hash)
    }
}
