//! Helpers shared by the embedded PostgreSQL integration suites.
//!
//! Each file under `tests/` compiles as its own crate, so suites pull this
//! module in with `mod support;`.

mod cluster_skip;

pub use cluster_skip::handle_cluster_setup_failure;

use pg_embedded_setup_unpriv::TestCluster;
use postgres::{Client, NoTls};

/// Render a `postgres` error including SQLSTATE, detail and hint when the
/// server supplied them; the plain `Display` output is just `db error`.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };

    let mut summary = format!("postgres error {:?}: {}", db_error.code(), db_error.message());
    for (label, value) in [("detail", db_error.detail()), ("hint", db_error.hint())] {
        if let Some(text) = value {
            summary.push_str(&format!("; {label}: {text}"));
        }
    }
    summary
}

/// Drop and recreate `name` on the cluster's maintenance database.
///
/// Uses the synchronous `postgres` client because `DROP DATABASE` cannot
/// run inside a transaction block.
pub fn reset_database(cluster: &TestCluster, name: &str) -> Result<String, String> {
    let admin_url = cluster.connection().database_url("postgres");
    let mut client = Client::connect(&admin_url, NoTls).map_err(|err| format_postgres_error(&err))?;
    client
        .batch_execute(&format!(
            "DROP DATABASE IF EXISTS \"{name}\" WITH (FORCE); CREATE DATABASE \"{name}\";"
        ))
        .map_err(|err| format_postgres_error(&err))?;
    Ok(cluster.connection().database_url(name))
}
