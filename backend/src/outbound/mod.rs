//! Outbound adapters implementing the record store ports.
//!
//! - **memory**: mutex-guarded maps, used when no database is configured
//! - **persistence**: PostgreSQL repositories using Diesel ORM
//!
//! Adapters only translate between domain records and their storage
//! representation. They contain no business logic.

pub mod memory;
pub mod persistence;
