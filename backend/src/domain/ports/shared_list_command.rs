//! Driving port for creating shared lists.

use async_trait::async_trait;

use crate::domain::{Error, ListCode, NewList, SharedList};

use super::{FixtureListCodeQuery, ListCodeQuery};

/// Domain use-case port for list creation.
///
/// Implementations persist the list and return it without waiting for the
/// invitees' `shared_with_me` sets to be updated.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SharedListCommand: Send + Sync {
    /// Persist `list` and start propagating it to its invitees.
    async fn create_list(&self, list: NewList) -> Result<SharedList, Error>;

    /// Remove the list carrying `code`. Invitees keep the code in their
    /// `shared_with_me`; reads skip it from then on.
    async fn delete_list(&self, code: &ListCode) -> Result<(), Error>;
}

/// Fixture command materialising the list without storing it.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSharedListCommand;

#[async_trait]
impl SharedListCommand for FixtureSharedListCommand {
    async fn create_list(&self, mut list: NewList) -> Result<SharedList, Error> {
        let code = match list.code.take() {
            Some(code) => code,
            None => FixtureListCodeQuery.generate_code().await?,
        };
        Ok(list.into_list(code))
    }

    async fn delete_list(&self, code: &ListCode) -> Result<(), Error> {
        Err(Error::not_found(format!("list {code} not found")))
    }
}
