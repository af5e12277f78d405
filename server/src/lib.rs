//! Placeholder REST backend for future user accounts. Nothing in the game
//! talks to this yet; it exists so the schema and routes have a home. There
//! is deliberately no authentication and the password column is stored as-is.

pub mod db;
pub mod error;
pub mod routes;

pub use db::{NewUser, User, UserRepository};
pub use error::ApiError;
pub use routes::router;
