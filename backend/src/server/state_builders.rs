//! Wiring of record stores and domain services into [`HttpState`].

use std::io;
use std::sync::Arc;

use tracing::info;

use listshare::domain::ports::{ListRepository, UserRepository};
use listshare::domain::{
    FanOut, FriendGraphService, ListCodeGenerator, ListSharingService, RngTokenSource,
    TokenSource, UserDirectoryService,
};
use listshare::inbound::http::state::HttpState;
use listshare::outbound::memory::{InMemoryListRepository, InMemoryUserRepository};
use listshare::outbound::persistence::{
    DbPool, DieselListRepository, DieselUserRepository, PoolConfig, run_migrations,
};

use super::ServerSettings;

/// Build the services over one pair of repositories.
pub(crate) fn wire_services<U, L>(
    users: Arc<U>,
    lists: Arc<L>,
    tokens: Arc<dyn TokenSource>,
    settings: &ServerSettings,
) -> HttpState
where
    U: UserRepository + 'static,
    L: ListRepository + 'static,
{
    let fan_out = FanOut::new(settings.fan_out_deadline());
    let attempts = settings.write_attempts();
    let codes = ListCodeGenerator::new(Arc::clone(&lists), tokens, settings.code_batch_size());

    let friends = Arc::new(
        FriendGraphService::new(Arc::clone(&users))
            .with_fan_out(fan_out)
            .with_write_attempts(attempts),
    );
    let sharing = Arc::new(
        ListSharingService::new(Arc::clone(&users), lists, codes.clone())
            .with_fan_out(fan_out)
            .with_write_attempts(attempts),
    );

    HttpState {
        friends_query: friends.clone(),
        friends_command: friends,
        list_codes: Arc::new(codes),
        lists_command: sharing.clone(),
        lists_query: sharing,
        users_command: Arc::new(UserDirectoryService::new(users)),
    }
}

/// Choose the record store from settings and build the HTTP state.
///
/// With a database URL, pending migrations are applied on a blocking
/// thread before the pool is built.
///
/// # Errors
/// Returns an [`io::Error`] when migrations fail or the pool cannot be built.
pub async fn build_http_state(settings: &ServerSettings) -> io::Result<HttpState> {
    let tokens: Arc<dyn TokenSource> = Arc::new(RngTokenSource::from_entropy());

    let Some(database_url) = settings.database_url.clone() else {
        info!("no database configured, using the in-memory record store");
        return Ok(wire_services(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryListRepository::new()),
            tokens,
            settings,
        ));
    };

    let migration_url = database_url.clone();
    let applied = tokio::task::spawn_blocking(move || run_migrations(&migration_url))
        .await
        .map_err(io::Error::other)?
        .map_err(io::Error::other)?;
    info!(applied, "database migrations applied");

    let pool = DbPool::new(PoolConfig::new(database_url).with_max_size(settings.pool_max_size()))
        .await
        .map_err(io::Error::other)?;

    Ok(wire_services(
        Arc::new(DieselUserRepository::new(pool.clone())),
        Arc::new(DieselListRepository::new(pool)),
        tokens,
        settings,
    ))
}
