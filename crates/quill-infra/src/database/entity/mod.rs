//! SeaORM entities. `users` owns `posts` and `sessions` through `user_id`.

pub mod post;
pub mod session;
pub mod user;
