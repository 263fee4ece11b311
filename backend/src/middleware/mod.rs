//! Actix middleware shared by every route.
//!
//! [`Trace`] opens the per-request trace scope and writes the access log.

pub mod trace;

pub use trace::Trace;
