use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// User entity - a registered author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    /// Argon2 PHC string. Never serialized.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Registration input. The password is still plaintext here.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewUser {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(
        email(message = "Email must be a valid email address"),
        custom(function = validate_email_domain)
    )]
    pub email: String,
    #[validate(length(min = 4, message = "Password must be at least 4 characters"))]
    pub password: String,
}

/// Partial update input. Only the fields that are `Some` are written.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UserChanges {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: Option<String>,
    #[validate(
        email(message = "Email must be a valid email address"),
        custom(function = validate_email_domain)
    )]
    pub email: Option<String>,
    #[validate(length(min = 4, message = "Password must be at least 4 characters"))]
    pub password: Option<String>,
}

impl NewUser {
    /// Canonical form: the email is trimmed and lowercased.
    pub fn normalized(self) -> Self {
        Self {
            email: normalize_email(&self.email),
            ..self
        }
    }
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none() && self.password.is_none()
    }

    /// Canonical form: a present email is trimmed and lowercased.
    pub fn normalized(self) -> Self {
        Self {
            email: self.email.as_deref().map(normalize_email),
            ..self
        }
    }
}

/// Emails are compared and stored case-insensitively.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// The domain must end in an alphabetic top-level label of two or more
/// characters (or a punycode one). Rejects `ada@localhost` and IP literals.
fn validate_email_domain(email: &str) -> Result<(), validator::ValidationError> {
    // missing '@' is the `email` rule's to report
    let Some((_, domain)) = email.rsplit_once('@') else {
        return Ok(());
    };

    let tld = domain.rsplit_once('.').map(|(_, tld)| tld);
    let valid = match tld {
        Some(tld) if tld.starts_with("xn--") => tld.len() > 4,
        Some(tld) => tld.chars().count() >= 2 && tld.chars().all(char::is_alphabetic),
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(validator::ValidationError::new("email_domain").with_message(Cow::Borrowed(
            "Email must include a domain with a top-level part",
        )))
    }
}

/// Output of the hashing pipeline.
///
/// Repositories only accept passwords in this form, so a plaintext value
/// cannot reach a write path by accident.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap a PHC string produced by a `PasswordService`.
    pub fn from_phc(phc: String) -> Self {
        Self(phc)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

/// A validated, hashed user ready to insert.
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub username: String,
    pub email: String,
    pub password: PasswordHash,
}

/// A validated, hashed partial update.
#[derive(Debug, Clone, Default)]
pub struct UserRecordChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<PasswordHash>,
}
