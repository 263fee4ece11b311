//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Saves are conditional updates filtered on the expected revision. When
//! no row matches, the current row is re-read to tell a lost race
//! (`RevisionMismatch`) from a deleted user (`Missing`).

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{Credentials, ListCode, User, UserId, UserProfile};

use super::models::{UserRecordRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            UserRepositoryError::connection(message)
        }
    }
}

fn map_diesel_error(error: DieselError) -> UserRepositoryError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            UserRepositoryError::connection("database connection error")
        }
        DieselError::NotFound => UserRepositoryError::query("record not found"),
        _ => UserRepositoryError::query("database error"),
    }
}

fn revision_to_db(revision: u32) -> Result<i32, UserRepositoryError> {
    i32::try_from(revision)
        .map_err(|_| UserRepositoryError::query(format!("revision {revision} out of range")))
}

fn revision_from_db(revision: i32) -> Result<u32, UserRepositoryError> {
    u32::try_from(revision)
        .map_err(|_| UserRepositoryError::query(format!("stored revision {revision} is negative")))
}

fn row_to_user(row: UserRow) -> Result<User, UserRepositoryError> {
    let shared_with_me = row
        .shared_with_me
        .into_iter()
        .map(|code| {
            ListCode::new(code.as_str())
                .map_err(|err| UserRepositoryError::query(format!("stored code {code}: {err}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let credentials = match (row.password_hash, row.password_salt) {
        (Some(hash), Some(salt)) => Some(Credentials { hash, salt }),
        _ => None,
    };

    Ok(User {
        id: UserId::from_uuid(row.id),
        profile: UserProfile {
            first_name: row.first_name,
            last_name: row.last_name,
            pseudo: row.pseudo,
            email: row.email,
        },
        credentials,
        friends: row.friends.into_iter().map(UserId::from_uuid).collect(),
        shared_with_me,
        revision: revision_from_db(row.revision)?,
    })
}

fn user_to_row(user: &User) -> Result<UserRecordRow<'_>, UserRepositoryError> {
    Ok(UserRecordRow {
        id: *user.id.as_uuid(),
        first_name: &user.profile.first_name,
        last_name: &user.profile.last_name,
        pseudo: &user.profile.pseudo,
        email: &user.profile.email,
        password_hash: user.credentials.as_ref().map(|c| c.hash.as_str()),
        password_salt: user.credentials.as_ref().map(|c| c.salt.as_str()),
        friends: user.friends.iter().map(|id| *id.as_uuid()).collect(),
        shared_with_me: user
            .shared_with_me
            .iter()
            .map(|code| code.as_str().to_owned())
            .collect(),
        revision: revision_to_db(user.revision)?,
        updated_at: Utc::now(),
    })
}

async fn explain_missed_update(
    conn: &mut AsyncPgConnection,
    id: Uuid,
    expected: u32,
) -> UserRepositoryError {
    let current = users::table
        .filter(users::id.eq(id))
        .select(users::revision)
        .first::<i32>(conn)
        .await
        .optional()
        .map_err(map_diesel_error);

    match current {
        Ok(Some(actual)) => match revision_from_db(actual) {
            Ok(actual) => UserRepositoryError::revision_mismatch(expected, actual),
            Err(err) => err,
        },
        Ok(None) => UserRepositoryError::missing(id.to_string()),
        Err(err) => err,
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email))
            .order(users::created_at.asc())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn insert(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = user_to_row(user)?;

        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| match err {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    UserRepositoryError::duplicate(user.id.to_string())
                }
                other => map_diesel_error(other),
            })
    }

    async fn save(&self, user: &User, expected_revision: u32) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = user_to_row(user)?;
        let expected = revision_to_db(expected_revision)?;

        let updated_rows = diesel::update(users::table)
            .filter(
                users::id
                    .eq(user.id.as_uuid())
                    .and(users::revision.eq(expected)),
            )
            .set(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        if updated_rows == 0 {
            return Err(explain_missed_update(&mut conn, *user.id.as_uuid(), expected_revision).await);
        }
        Ok(())
    }
}
