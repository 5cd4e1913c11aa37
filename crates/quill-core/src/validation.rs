//! Explicit constraint checks, run before anything is hashed or written.

use std::fmt;

use serde::Serialize;
use validator::{Validate, ValidationErrors};

/// A single failed constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

/// One or more failed constraints. Nothing was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl ValidationError {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            violations: vec![Violation {
                field: field.into(),
                message: message.into(),
            }],
        }
    }

    pub fn duplicate_email() -> Self {
        Self::single("email", "Email is already registered")
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .violations
            .iter()
            .map(|v| format!("{}: {}", v.field, v.message))
            .collect();
        f.write_str(&parts.join(", "))
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationErrors> for ValidationError {
    fn from(errors: ValidationErrors) -> Self {
        let mut violations: Vec<Violation> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                let field = field.to_string();
                errs.iter().map(move |e| Violation {
                    field: field.clone(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();
        violations.sort_by(|a, b| a.field.cmp(&b.field));
        Self { violations }
    }
}

/// Run the declared constraints of `input`.
pub fn check<T: Validate>(input: &T) -> Result<(), ValidationError> {
    input.validate().map_err(ValidationError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewPost, NewUser, UserChanges};

    fn ada() -> NewUser {
        NewUser {
            username: "ada".to_string(),
            email: "ada@x.com".to_string(),
            password: "secret".to_string(),
        }
    }

    #[test]
    fn accepts_valid_user() {
        assert!(check(&ada()).is_ok());
    }

    #[test]
    fn rejects_short_password() {
        let input = NewUser {
            password: "abc".to_string(),
            ..ada()
        };
        let err = check(&input).unwrap_err();
        assert!(err.has_field("password"));
        assert_eq!(err.violations.len(), 1);
    }

    #[test]
    fn four_characters_is_enough() {
        let input = NewUser {
            password: "abcd".to_string(),
            ..ada()
        };
        assert!(check(&input).is_ok());
    }

    #[test]
    fn rejects_malformed_email_and_empty_username() {
        let input = NewUser {
            username: String::new(),
            email: "not-an-email".to_string(),
            ..ada()
        };
        let err = check(&input).unwrap_err();
        assert!(err.has_field("email"));
        assert!(err.has_field("username"));
        // sorted by field name
        assert_eq!(err.violations[0].field, "email");
    }

    #[test]
    fn email_needs_a_top_level_domain() {
        for email in ["ada@localhost", "ada@x.c", "ada@[10.0.0.1]", "ada@host.123"] {
            let input = NewUser {
                email: email.to_string(),
                ..ada()
            };
            let err = check(&input).unwrap_err();
            assert!(err.has_field("email"), "{email} should be rejected");
        }

        for email in ["ada@x.com", "ada@mail.example.co.uk", "ada@x.xn--p1ai"] {
            let input = NewUser {
                email: email.to_string(),
                ..ada()
            };
            assert!(check(&input).is_ok(), "{email} should be accepted");
        }
    }

    #[test]
    fn malformed_email_is_reported_once() {
        let input = NewUser {
            email: "not-an-email".to_string(),
            ..ada()
        };
        assert_eq!(check(&input).unwrap_err().violations.len(), 1);
    }

    #[test]
    fn email_domain_rule_applies_to_changes() {
        let changes = UserChanges {
            email: Some("ada@localhost".to_string()),
            ..Default::default()
        };
        assert!(check(&changes).unwrap_err().has_field("email"));
    }

    #[test]
    fn changes_only_check_present_fields() {
        assert!(check(&UserChanges::default()).is_ok());

        let changes = UserChanges {
            password: Some("no".to_string()),
            ..Default::default()
        };
        assert!(check(&changes).unwrap_err().has_field("password"));
    }

    #[test]
    fn post_needs_title_and_content() {
        let post = NewPost {
            title: String::new(),
            content: String::new(),
        };
        let err = check(&post).unwrap_err();
        assert!(err.has_field("title"));
        assert!(err.has_field("content"));
    }

    #[test]
    fn display_lists_every_violation() {
        let err = ValidationError::duplicate_email();
        assert_eq!(err.to_string(), "email: Email is already registered");
    }
}
