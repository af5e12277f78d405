use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::Serialize;

use crate::db::schema;

/// User row. The password stays internal; API responses go through
/// [`User::to_api`].
#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = schema::users)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub password: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::users)]
pub struct NewUser {
    pub username: String,
    pub password: String,
}

/// The wire shape: everything except the password.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ApiUser {
    pub id: i32,
    pub username: String,
    pub created_at: NaiveDateTime,
}

impl User {
    pub fn to_api(&self) -> ApiUser {
        ApiUser {
            id: self.id,
            username: self.username.clone(),
            created_at: self.created_at,
        }
    }
}
