//! Retry loop for optimistic read-modify-write cycles.
//!
//! A cycle re-reads the record, applies its change and saves it
//! conditionally on the revision it read. When the save reports a revision
//! mismatch the whole cycle runs again from a fresh read, up to a fixed
//! number of attempts.

use std::future::Future;

use serde_json::json;
use tracing::debug;

use super::Error;
use super::ports::UserRepositoryError;

/// Default number of read-modify-write attempts.
pub const DEFAULT_WRITE_ATTEMPTS: u32 = 3;

/// Failure of a single read-modify-write attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptError {
    /// The conditional write lost against a concurrent modification.
    Conflict {
        /// Revision the attempt read.
        expected: u32,
        /// Revision found at write time.
        actual: u32,
    },
    /// Any other failure; ends the loop immediately.
    Fatal(Error),
}

impl From<Error> for AttemptError {
    fn from(err: Error) -> Self {
        Self::Fatal(err)
    }
}

impl From<UserRepositoryError> for AttemptError {
    fn from(err: UserRepositoryError) -> Self {
        match err {
            UserRepositoryError::RevisionMismatch { expected, actual } => {
                Self::Conflict { expected, actual }
            }
            other => Self::Fatal(map_user_repository_error(other)),
        }
    }
}

/// Translate a user store failure into a domain error.
pub(crate) fn map_user_repository_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserRepositoryError::RevisionMismatch { expected, actual } => {
            revision_conflict(expected, actual, 1)
        }
        UserRepositoryError::Missing { id } => Error::not_found(format!("user {id} not found")),
        UserRepositoryError::Duplicate { id } => {
            Error::conflict(format!("user {id} already exists"))
        }
    }
}

fn revision_conflict(expected: u32, actual: u32, attempts: u32) -> Error {
    Error::conflict("concurrent modification, please retry").with_details(json!({
        "expectedRevision": expected,
        "actualRevision": actual,
        "attempts": attempts,
        "code": "revision_mismatch",
    }))
}

/// Run `attempt` until it succeeds, fails fatally, or `attempts` conflicts
/// have been observed.
///
/// `attempt` receives the 1-based attempt number. At least one attempt is
/// always made.
pub async fn retry_on_conflict<T, F, Fut>(attempts: u32, mut attempt: F) -> Result<T, Error>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, AttemptError>>,
{
    let attempts = attempts.max(1);
    let mut number = 1;
    loop {
        match attempt(number).await {
            Ok(value) => return Ok(value),
            Err(AttemptError::Fatal(err)) => return Err(err),
            Err(AttemptError::Conflict { expected, actual }) => {
                if number >= attempts {
                    return Err(revision_conflict(expected, actual, number));
                }
                debug!(
                    attempt = number,
                    expected, actual, "write conflict, retrying from fresh read"
                );
                number += 1;
            }
        }
    }
}
