//! Diesel row structs for the `users` and `lists` tables.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use super::schema::{lists, users};

/// Row read from `users`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub pseudo: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub password_salt: Option<String>,
    pub friends: Vec<Uuid>,
    pub shared_with_me: Vec<String>,
    pub revision: i32,
}

/// Insertable and changeset view of a user record.
///
/// Saves write every column, mirroring the whole-record replacement the
/// domain performs.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserRecordRow<'a> {
    pub id: Uuid,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub pseudo: &'a str,
    pub email: &'a str,
    pub password_hash: Option<&'a str>,
    pub password_salt: Option<&'a str>,
    pub friends: Vec<Uuid>,
    pub shared_with_me: Vec<String>,
    pub revision: i32,
    pub updated_at: DateTime<Utc>,
}

/// Row read from `lists`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = lists)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ListRow {
    pub id: Uuid,
    pub code: String,
    pub owner_id: Uuid,
    pub name: String,
    pub shared_with: Value,
    pub content: Value,
    pub created_at: DateTime<Utc>,
}

/// Insertable list record.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = lists)]
pub(crate) struct NewListRow<'a> {
    pub id: Uuid,
    pub code: &'a str,
    pub owner_id: Uuid,
    pub name: &'a str,
    pub shared_with: Value,
    pub content: Value,
    pub created_at: DateTime<Utc>,
}
