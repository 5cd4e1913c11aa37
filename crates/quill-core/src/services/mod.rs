//! Application services. Every write path of the model goes through here.

mod accounts;
mod posts;
mod sessions;

pub use accounts::AccountService;
pub use posts::PostService;
pub use sessions::SessionService;
