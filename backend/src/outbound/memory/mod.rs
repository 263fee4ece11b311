//! In-process record store.
//!
//! Backs both repositories with mutex-guarded maps. It honours the same
//! contracts as the PostgreSQL adapters (conditional saves, unique list
//! codes), which makes it the default store when no database URL is
//! configured and a convenient collaborator in integration tests.

mod lists;
mod users;

pub use lists::InMemoryListRepository;
pub use users::InMemoryUserRepository;
