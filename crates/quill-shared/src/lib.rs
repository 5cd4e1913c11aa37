//! # Quill Shared
//!
//! Request and response bodies of the JSON API.
//! Kept free of domain types so clients can depend on it alone.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse, FieldError};
