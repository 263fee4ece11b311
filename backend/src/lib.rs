//! Friend graph and shared list service.
//!
//! The crate follows a hexagonal layout: [`domain`] holds the types, ports
//! and services; [`outbound`] implements the record store ports; [`inbound`]
//! exposes the services over HTTP.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
