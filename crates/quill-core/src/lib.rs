//! # Quill Core
//!
//! The domain layer of the Quill blog.
//! Entities, ports, validation rules and the services that tie them together.
//! Nothing in here knows about SeaORM, Argon2 or HTTP.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;
pub mod validation;

pub use error::DomainError;
pub use services::{AccountService, PostService, SessionService};
