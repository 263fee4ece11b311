//! PostgreSQL-backed `ListRepository` implementation using Diesel ORM.
//!
//! Invitees and content are stored as JSONB. The unique index on `code`
//! is the authoritative guard against two lists sharing a code.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{ListRepository, ListRepositoryError};
use crate::domain::{Invitee, ListCode, ListId, SharedList, UserId};

use super::models::{ListRow, NewListRow};
use super::pool::{DbPool, PoolError};
use super::schema::lists;

/// Diesel-backed implementation of the `ListRepository` port.
#[derive(Clone)]
pub struct DieselListRepository {
    pool: DbPool,
}

impl DieselListRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ListRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            ListRepositoryError::connection(message)
        }
    }
}

fn map_diesel_error(error: DieselError) -> ListRepositoryError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            ListRepositoryError::connection("database connection error")
        }
        _ => ListRepositoryError::query("database error"),
    }
}

fn code_strings(codes: &[ListCode]) -> Vec<String> {
    codes.iter().map(|code| code.as_str().to_owned()).collect()
}

fn parse_code(raw: String) -> Result<ListCode, ListRepositoryError> {
    ListCode::new(raw.as_str())
        .map_err(|err| ListRepositoryError::query(format!("stored code {raw}: {err}")))
}

fn row_to_list(row: ListRow) -> Result<SharedList, ListRepositoryError> {
    let shared_with: Vec<Invitee> = serde_json::from_value(row.shared_with)
        .map_err(|err| ListRepositoryError::query(format!("stored invitees: {err}")))?;

    Ok(SharedList {
        id: ListId::from_uuid(row.id),
        code: parse_code(row.code)?,
        owner: UserId::from_uuid(row.owner_id),
        name: row.name,
        shared_with,
        content: row.content,
        created_at: row.created_at,
    })
}

fn list_to_row(list: &SharedList) -> Result<NewListRow<'_>, ListRepositoryError> {
    let shared_with = serde_json::to_value(&list.shared_with)
        .map_err(|err| ListRepositoryError::query(format!("encode invitees: {err}")))?;

    Ok(NewListRow {
        id: *list.id.as_uuid(),
        code: list.code.as_str(),
        owner_id: *list.owner.as_uuid(),
        name: &list.name,
        shared_with,
        content: list.content.clone(),
        created_at: list.created_at,
    })
}

#[async_trait]
impl ListRepository for DieselListRepository {
    async fn find_by_code(
        &self,
        code: &ListCode,
    ) -> Result<Option<SharedList>, ListRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ListRow> = lists::table
            .filter(lists::code.eq(code.as_str()))
            .select(ListRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_list).transpose()
    }

    async fn find_existing_codes(
        &self,
        codes: &[ListCode],
    ) -> Result<Vec<ListCode>, ListRepositoryError> {
        if codes.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let taken: Vec<String> = lists::table
            .filter(lists::code.eq_any(code_strings(codes)))
            .select(lists::code)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        taken.into_iter().map(parse_code).collect()
    }

    async fn find_by_codes(
        &self,
        codes: &[ListCode],
    ) -> Result<Vec<SharedList>, ListRepositoryError> {
        if codes.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ListRow> = lists::table
            .filter(lists::code.eq_any(code_strings(codes)))
            .order(lists::created_at.asc())
            .then_order_by(lists::code.asc())
            .select(ListRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_list).collect()
    }

    async fn find_by_owner(&self, owner: &UserId) -> Result<Vec<SharedList>, ListRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ListRow> = lists::table
            .filter(lists::owner_id.eq(owner.as_uuid()))
            .order(lists::created_at.asc())
            .then_order_by(lists::code.asc())
            .select(ListRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_list).collect()
    }

    async fn delete(&self, code: &ListCode) -> Result<bool, ListRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let removed = diesel::delete(lists::table.filter(lists::code.eq(code.as_str())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(removed > 0)
    }

    async fn insert(&self, list: &SharedList) -> Result<(), ListRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = list_to_row(list)?;

        diesel::insert_into(lists::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| match err {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    ListRepositoryError::duplicate_code(list.code.as_str())
                }
                other => map_diesel_error(other),
            })
    }
}
