//! Domain entities - the core business objects.

mod post;
mod session;
mod user;

pub use post::{NewPost, Post, PostChanges};
pub use session::Session;
pub use user::{
    NewUser, NewUserRecord, PasswordHash, User, UserChanges, UserRecordChanges, normalize_email,
};
