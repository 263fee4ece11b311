//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`) describe the record store the domain
//! consumes. Driving ports (`*Query`, `*Command`) are the use-cases inbound
//! adapters call. Every port ships a `Fixture*` implementation and, under
//! test, a mockall mock.

mod macros;
pub(crate) use macros::define_port_error;

mod friends_command;
mod friends_query;
mod list_code_query;
mod list_repository;
mod shared_list_command;
mod shared_list_query;
mod user_repository;
mod users_command;

pub use friends_command::{FixtureFriendsCommand, FriendsCommand};
#[cfg(test)]
pub use friends_command::MockFriendsCommand;
pub use friends_query::{FixtureFriendsQuery, FriendListing, FriendsQuery};
#[cfg(test)]
pub use friends_query::MockFriendsQuery;
pub use list_code_query::{FIXTURE_LIST_CODE, FixtureListCodeQuery, ListCodeQuery};
#[cfg(test)]
pub use list_code_query::MockListCodeQuery;
pub use list_repository::{FixtureListRepository, ListRepository, ListRepositoryError};
#[cfg(test)]
pub use list_repository::MockListRepository;
pub use shared_list_command::{FixtureSharedListCommand, SharedListCommand};
#[cfg(test)]
pub use shared_list_command::MockSharedListCommand;
pub use shared_list_query::{FixtureSharedListQuery, SharedListQuery};
#[cfg(test)]
pub use shared_list_query::MockSharedListQuery;
pub use user_repository::{FixtureUserRepository, UserRepository, UserRepositoryError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use users_command::{FixtureUsersCommand, UsersCommand};
#[cfg(test)]
pub use users_command::MockUsersCommand;
