//! Driving port for reading shared lists.

use async_trait::async_trait;

use crate::domain::{Error, ListCode, SharedList, UserId};

/// Domain use-case port for list lookups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SharedListQuery: Send + Sync {
    /// Fetch a single list by its shareable code.
    async fn get_list(&self, code: &ListCode) -> Result<SharedList, Error>;

    /// Lists other users shared with `user_id`.
    async fn shared_lists_for(&self, user_id: &UserId) -> Result<Vec<SharedList>, Error>;

    /// Lists created by `owner`, oldest first.
    async fn lists_owned_by(&self, owner: &UserId) -> Result<Vec<SharedList>, Error>;
}

/// Fixture query over an empty store.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSharedListQuery;

#[async_trait]
impl SharedListQuery for FixtureSharedListQuery {
    async fn get_list(&self, code: &ListCode) -> Result<SharedList, Error> {
        Err(Error::not_found(format!("list {code} not found")))
    }

    async fn shared_lists_for(&self, _user_id: &UserId) -> Result<Vec<SharedList>, Error> {
        Ok(Vec::new())
    }

    async fn lists_owned_by(&self, _owner: &UserId) -> Result<Vec<SharedList>, Error> {
        Ok(Vec::new())
    }
}
