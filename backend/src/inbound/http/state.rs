//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without I/O. It is built once
//! at start-up and cloned cheaply into each worker.

use std::sync::Arc;

use crate::domain::ports::{
    FixtureFriendsCommand, FixtureFriendsQuery, FixtureListCodeQuery, FixtureSharedListCommand,
    FixtureSharedListQuery, FixtureUsersCommand, FriendsCommand, FriendsQuery, ListCodeQuery,
    SharedListCommand, SharedListQuery, UsersCommand,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub friends_query: Arc<dyn FriendsQuery>,
    pub friends_command: Arc<dyn FriendsCommand>,
    pub list_codes: Arc<dyn ListCodeQuery>,
    pub lists_command: Arc<dyn SharedListCommand>,
    pub lists_query: Arc<dyn SharedListQuery>,
    pub users_command: Arc<dyn UsersCommand>,
}

impl HttpState {
    /// State wired entirely to fixture ports.
    ///
    /// Tests override the handles they exercise:
    ///
    /// ```
    /// use std::sync::Arc;
    ///
    /// use listshare::domain::ports::FixtureFriendsQuery;
    /// use listshare::inbound::http::state::HttpState;
    ///
    /// let state = HttpState {
    ///     friends_query: Arc::new(FixtureFriendsQuery),
    ///     ..HttpState::fixture()
    /// };
    /// let _ = state.friends_query.clone();
    /// ```
    pub fn fixture() -> Self {
        Self {
            friends_query: Arc::new(FixtureFriendsQuery),
            friends_command: Arc::new(FixtureFriendsCommand),
            list_codes: Arc::new(FixtureListCodeQuery),
            lists_command: Arc::new(FixtureSharedListCommand),
            lists_query: Arc::new(FixtureSharedListQuery),
            users_command: Arc::new(FixtureUsersCommand),
        }
    }
}
