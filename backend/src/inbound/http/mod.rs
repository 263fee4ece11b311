//! HTTP inbound adapter exposing REST endpoints.

pub mod error;
pub mod friends;
pub mod health;
pub mod lists;
pub mod state;
pub mod users;
pub mod validation;

pub use error::ApiResult;
