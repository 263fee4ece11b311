//! Server entry-point: loads settings, wires the record store and serves
//! the REST endpoints.

mod server;

use std::ffi::OsString;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use listshare::inbound::http::health::HealthState;
use server::{ServerSettings, build_http_state, create_server};

/// Load settings from an argument iterator plus the environment.
fn load_settings<I>(args: I) -> std::io::Result<ServerSettings>
where
    I: IntoIterator<Item = OsString>,
{
    ServerSettings::load_from_iter(args)
        .map_err(|err| std::io::Error::other(format!("failed to load settings: {err}")))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = load_settings(std::env::args_os())?;
    let bind_addr = settings
        .bind_addr()
        .map_err(|err| std::io::Error::other(format!("invalid bind address: {err}")))?;

    let health_state = web::Data::new(HealthState::new());
    let http_state = build_http_state(&settings).await?;
    let server = create_server(health_state, http_state, bind_addr)?;
    info!(%bind_addr, "listshare listening");
    server.await
}
