//! Port for user record persistence.
//!
//! The store offers atomic single-record reads and writes only. Writes are
//! conditional on the caller's expected revision so read-modify-write
//! cycles detect concurrent modification instead of silently overwriting.

use async_trait::async_trait;

use crate::domain::{User, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "user repository query failed: {message}",
        /// Optimistic concurrency check failed.
        RevisionMismatch { expected: u32, actual: u32 } =>
            "revision mismatch: expected {expected}, found {actual}",
        /// The record to update no longer exists.
        Missing { id: String } =>
            "user {id} no longer exists",
        /// A record with the same id already exists.
        Duplicate { id: String } =>
            "user {id} already exists",
    }
}

/// Port for user storage and retrieval.
///
/// # Revision Semantics
///
/// - Inserted users start at the revision they carry (normally 1).
/// - [`UserRepository::save`] succeeds only while the stored revision
///   equals `expected_revision`, and stores the record as given. Callers
///   bump `user.revision` beforehand (see [`User::bump_revision`]).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a user by id, `None` when absent.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Fetch the user registered under `email` (exact match).
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserRepositoryError>;

    /// Insert a new user.
    async fn insert(&self, user: &User) -> Result<(), UserRepositoryError>;

    /// Replace the whole stored record if its revision still matches.
    async fn save(&self, user: &User, expected_revision: u32) -> Result<(), UserRepositoryError>;
}

/// Fixture implementation for tests that never touch users.
///
/// Every lookup misses and every write is accepted and discarded.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserRepository;

#[async_trait]
impl UserRepository for FixtureUserRepository {
    async fn find_by_id(&self, _id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        Ok(None)
    }

    async fn find_by_email(&self, _email: &str) -> Result<Option<User>, UserRepositoryError> {
        Ok(None)
    }

    async fn insert(&self, _user: &User) -> Result<(), UserRepositoryError> {
        Ok(())
    }

    async fn save(
        &self,
        _user: &User,
        _expected_revision: u32,
    ) -> Result<(), UserRepositoryError> {
        Ok(())
    }
}
