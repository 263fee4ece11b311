//! Port for shared list persistence.

use async_trait::async_trait;

use crate::domain::{ListCode, SharedList, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by list repository adapters.
    pub enum ListRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "list repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "list repository query failed: {message}",
        /// The store's uniqueness guard rejected the code.
        DuplicateCode { code: String } =>
            "list code {code} is already taken",
    }
}

/// Port for list storage and code lookups.
///
/// Adapters must enforce code uniqueness at write time and report a
/// violation as [`ListRepositoryError::DuplicateCode`]; availability checks
/// made through [`ListRepository::find_existing_codes`] are advisory.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListRepository: Send + Sync {
    /// Fetch the list carrying `code`.
    async fn find_by_code(&self, code: &ListCode) -> Result<Option<SharedList>, ListRepositoryError>;

    /// Return the subset of `codes` already assigned to a list.
    async fn find_existing_codes(
        &self,
        codes: &[ListCode],
    ) -> Result<Vec<ListCode>, ListRepositoryError>;

    /// Fetch every list whose code appears in `codes`; unknown codes are
    /// skipped.
    ///
    /// Lists come back oldest first (`created_at`, then code), whatever
    /// the order of `codes`.
    async fn find_by_codes(&self, codes: &[ListCode]) -> Result<Vec<SharedList>, ListRepositoryError>;

    /// Every list owned by `owner`, oldest first.
    async fn find_by_owner(&self, owner: &UserId) -> Result<Vec<SharedList>, ListRepositoryError>;

    /// Insert a new list.
    async fn insert(&self, list: &SharedList) -> Result<(), ListRepositoryError>;

    /// Remove the list carrying `code`; `false` when there was none.
    ///
    /// Users' `shared_with_me` entries are left in place.
    async fn delete(&self, code: &ListCode) -> Result<bool, ListRepositoryError>;
}

/// Fixture implementation: an always-empty store that accepts inserts.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureListRepository;

#[async_trait]
impl ListRepository for FixtureListRepository {
    async fn find_by_code(
        &self,
        _code: &ListCode,
    ) -> Result<Option<SharedList>, ListRepositoryError> {
        Ok(None)
    }

    async fn find_existing_codes(
        &self,
        _codes: &[ListCode],
    ) -> Result<Vec<ListCode>, ListRepositoryError> {
        Ok(Vec::new())
    }

    async fn find_by_codes(
        &self,
        _codes: &[ListCode],
    ) -> Result<Vec<SharedList>, ListRepositoryError> {
        Ok(Vec::new())
    }

    async fn find_by_owner(&self, _owner: &UserId) -> Result<Vec<SharedList>, ListRepositoryError> {
        Ok(Vec::new())
    }

    async fn insert(&self, _list: &SharedList) -> Result<(), ListRepositoryError> {
        Ok(())
    }

    async fn delete(&self, _code: &ListCode) -> Result<bool, ListRepositoryError> {
        Ok(false)
    }
}
