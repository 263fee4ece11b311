//! Driving port for issuing fresh list codes.

use async_trait::async_trait;

use crate::domain::{Error, ListCode};

/// Domain use-case port returning a code not held by any stored list.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListCodeQuery: Send + Sync {
    /// Produce a code that no stored list currently uses.
    async fn generate_code(&self) -> Result<ListCode, Error>;
}

/// Fixture query returning a constant code.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureListCodeQuery;

/// Code returned by [`FixtureListCodeQuery`].
pub const FIXTURE_LIST_CODE: &str = "0000c0de";

#[async_trait]
impl ListCodeQuery for FixtureListCodeQuery {
    async fn generate_code(&self) -> Result<ListCode, Error> {
        ListCode::new(FIXTURE_LIST_CODE).map_err(|err| Error::internal(err.to_string()))
    }
}
