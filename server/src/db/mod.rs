//! Database persistence layer: a single `users` table behind a small
//! repository type.

mod models;
mod repository;
mod schema;

pub use models::{ApiUser, NewUser, User};
pub use repository::UserRepository;
