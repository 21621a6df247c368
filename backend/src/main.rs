//! Backend entry-point: configuration, pool, and server startup.

use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::outbound::persistence::{DbPool, PoolConfig};
use backend::server::{ServerConfig, build_http_state, run};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = ServerConfig::from_env().map_err(std::io::Error::other)?;
    let pool = DbPool::new(
        PoolConfig::new(config.database_url.clone()).with_max_size(config.pool_max_size),
    )
    .await
    .map_err(|e| std::io::Error::other(format!("database pool setup failed: {e}")))?;

    let state = build_http_state(pool, &config)?;
    info!(addr = %config.bind_addr, "starting server");
    run(&config, state)?.await
}
