//! Server settings loaded via OrthoConfig.
//!
//! Every value may come from the command line, a `LISTSHARE_*` environment
//! variable or a configuration file. Unset values fall back to the
//! defaults below.

use std::net::{AddrParseError, SocketAddr};
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use listshare::domain::fan_out::DEFAULT_FAN_OUT_DEADLINE;
use listshare::domain::list_code::DEFAULT_CODE_BATCH_SIZE;
use listshare::domain::optimistic::DEFAULT_WRITE_ATTEMPTS;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_POOL_MAX_SIZE: u32 = 10;

/// Runtime settings for the HTTP server and its record store.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "LISTSHARE")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; the in-memory store is used when absent.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub pool_max_size: Option<u32>,
    /// Deadline covering a whole fan-out, in milliseconds.
    pub fan_out_timeout_ms: Option<u64>,
    /// Attempts per optimistic read-modify-write cycle.
    pub write_attempts: Option<u32>,
    /// Candidate codes drawn per availability query.
    pub code_batch_size: Option<usize>,
}

impl ServerSettings {
    /// Settings with every value unset, so defaults apply throughout.
    #[cfg(test)]
    pub(crate) fn unset() -> Self {
        Self {
            bind_addr: None,
            database_url: None,
            pool_max_size: None,
            fan_out_timeout_ms: None,
            write_attempts: None,
            code_batch_size: None,
        }
    }

    /// Parse the configured bind address.
    pub fn bind_addr(&self) -> Result<SocketAddr, AddrParseError> {
        self.bind_addr
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDR)
            .parse()
    }

    /// Upper bound on pooled database connections, at least one.
    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE).max(1)
    }

    /// Deadline covering a whole fan-out.
    pub fn fan_out_deadline(&self) -> Duration {
        self.fan_out_timeout_ms
            .map_or(DEFAULT_FAN_OUT_DEADLINE, Duration::from_millis)
    }

    /// Attempts allowed per conditional user write, at least one.
    pub fn write_attempts(&self) -> u32 {
        self.write_attempts.unwrap_or(DEFAULT_WRITE_ATTEMPTS).max(1)
    }

    /// Candidates drawn per list code availability query, at least one.
    pub fn code_batch_size(&self) -> usize {
        self.code_batch_size.unwrap_or(DEFAULT_CODE_BATCH_SIZE).max(1)
    }
}
