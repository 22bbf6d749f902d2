use std::net::SocketAddr;

use interfaces_tmdb_movies::index::TmdbClient;
use projects_movies_api::config::{AppConfig, ConfigError};
use projects_movies_api::db::{ConnectError, Db};
use projects_movies_api::endpoints::providers::links::TmdbSource;
use projects_movies_api::middleware::auth::BearerToken;
use projects_movies_api::middleware::client::TrustedProxies;
use projects_movies_api::middleware::rate_limit::RateLimiter;
use projects_movies_api::router::{build_router, AppContext};
use thiserror::Error;
use tracing::{info, warn};
use utils_trace::tracing_init;

#[derive(Debug, Error)]
pub enum MainError {
    #[error("LoadConfig: {source}")]
    LoadConfig {
        #[from]
        source: ConfigError,
    },

    #[error("TracingInit: {source}")]
    TracingInit {
        #[source]
        source: utils_trace::TracingInitError,
    },

    #[error("ConnectDatabase: {source}")]
    ConnectDatabase {
        #[from]
        source: ConnectError,
    },

    #[error("InvalidAddress {address}: {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("TcpListenerBind: {source}")]
    TcpListenerBind {
        #[source]
        source: std::io::Error,
    },

    #[error("Serve: {source}")]
    Serve {
        #[source]
        source: std::io::Error,
    },
}

#[tokio::main]
async fn main() -> Result<(), MainError> {
    let config = AppConfig::from_env()?;
    tracing_init(&config.log_level, config.log_format)
        .map_err(|source| MainError::TracingInit { source })?;

    let bearer_token = BearerToken::new(config.require_bearer_token()?);
    let db = Db::connect(&config.mongodb_uri, &config.mongodb_db).await?;
    if let Err(err) = db.ping().await {
        warn!(error = %err, "MongoDB not reachable yet, continuing");
    }

    let tmdb = match config.tmdb_api_key.as_deref() {
        Some(api_key) => TmdbSource(Some(TmdbClient::new(api_key, config.tmdb_base_url.as_str()))),
        None => {
            warn!("TMDB_API_KEY not set, provider lookups will fail on cache misses");
            TmdbSource(None)
        }
    };

    let app = build_router(AppContext {
        db,
        tmdb,
        bearer_token,
        limiter: RateLimiter::new(config.rate_limit_window, config.rate_limit_max_requests),
        trusted_proxies: TrustedProxies::new(config.trusted_proxies.clone()),
        allowed_origins: config.allowed_origins.clone(),
        body_limit_bytes: config.body_limit_bytes,
    });

    let address = format!("{}:{}", config.host, config.port);
    let addr: SocketAddr = address
        .parse()
        .map_err(|source| MainError::InvalidAddress { address, source })?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| MainError::TcpListenerBind { source })?;

    info!(%addr, database = %config.mongodb_db, "Server running");

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|source| MainError::Serve { source })?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
