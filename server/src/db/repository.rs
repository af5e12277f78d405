use std::sync::Mutex;

use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tracing::info;

use crate::db::schema::users;
use crate::db::{NewUser, User};
use crate::error::ApiError;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Synchronous diesel connection behind a mutex; callers hop through
/// `spawn_blocking`, so the single writer never stalls the runtime.
pub struct UserRepository {
    conn: Mutex<SqliteConnection>,
}

impl UserRepository {
    /// Open (or create) the database and run pending migrations.
    pub fn new(database_url: &str) -> Result<Self, ApiError> {
        let mut conn = SqliteConnection::establish(database_url)
            .map_err(|e| ApiError::Internal(format!("connect {database_url}: {e}")))?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| ApiError::Internal(format!("migrations: {e}")))?;
        if !applied.is_empty() {
            info!(target: "db", "applied {} migration(s)", applied.len());
        }
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn create(&self, new_user: NewUser) -> Result<User, ApiError> {
        let mut conn = self.conn.lock().expect("repository mutex poisoned");
        diesel::insert_into(users::table)
            .values(&new_user)
            .returning(User::as_returning())
            .get_result(&mut *conn)
            .map_err(|e| match e {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    ApiError::UsernameTaken
                }
                other => other.into(),
            })
    }

    pub fn list(&self) -> Result<Vec<User>, ApiError> {
        let mut conn = self.conn.lock().expect("repository mutex poisoned");
        Ok(users::table
            .order(users::id.asc())
            .select(User::as_select())
            .load(&mut *conn)?)
    }

    pub fn get(&self, id: i32) -> Result<Option<User>, ApiError> {
        let mut conn = self.conn.lock().expect("repository mutex poisoned");
        Ok(users::table
            .find(id)
            .select(User::as_select())
            .first(&mut *conn)
            .optional()?)
    }

    /// Returns whether a row was actually deleted.
    pub fn delete(&self, id: i32) -> Result<bool, ApiError> {
        let mut conn = self.conn.lock().expect("repository mutex poisoned");
        let deleted = diesel::delete(users::table.find(id)).execute(&mut *conn)?;
        Ok(deleted > 0)
    }
}
