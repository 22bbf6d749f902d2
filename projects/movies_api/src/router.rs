use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{self, HeaderName, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware::from_fn,
    routing::{delete, get},
    Extension, Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::db::Db;
use crate::endpoints::providers::links::TmdbSource;
use crate::endpoints::{bans, countries, crud, fallback, health, movies, providers};
use crate::middleware::auth::{require_bearer, BearerToken};
use crate::middleware::ban_check::reject_banned;
use crate::middleware::client::{TrustedProxies, WALLET_HEADER};
use crate::middleware::rate_limit::{rate_limit, RateLimiter};
use crate::middleware::request_log::log_request;

/// Everything the handlers and middleware share.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub db: Db,
    pub tmdb: TmdbSource,
    pub bearer_token: BearerToken,
    pub limiter: RateLimiter,
    pub trusted_proxies: TrustedProxies,
    /// Empty allows any origin.
    pub allowed_origins: Vec<String>,
    pub body_limit_bytes: usize,
}

/// Handlers under `/api` without the middleware chain. Static segments are
/// matched before the `{database}/{collection}` captures, so `bans`,
/// `providers` and `movie-details` cannot be read as database names.
pub fn api_handlers() -> Router {
    Router::new()
        .route("/movies-with-actors", get(movies::with_actors::index::handler))
        .route("/movie-details/{id}", get(movies::details::index::handler))
        .route("/countries", get(countries::list::index::handler))
        .route(
            "/providers/{movie_id}",
            get(providers::list::index::handler).post(providers::lookup::index::handler),
        )
        .route("/bans", get(bans::list::index::handler).post(bans::create::index::handler))
        .route("/bans/{id}", delete(bans::delete::index::handler))
        .route(
            "/{database}/{collection}",
            get(crud::find::index::find_many)
                .post(crud::create::index::handler)
                .put(crud::upsert_settings::index::handler),
        )
        .route(
            "/{database}/{collection}/{id}",
            get(crud::find::index::find_one)
                .put(crud::update::index::handler)
                .delete(crud::delete::index::handler),
        )
}

/// [`api_handlers`] behind the `/api` middleware chain.
pub fn api_routes() -> Router {
    api_handlers()
        // Applied bottom-up: rate limit runs first, request log last.
        .layer(from_fn(log_request))
        .layer(from_fn(reject_banned))
        .layer(from_fn(require_bearer))
        .layer(from_fn(rate_limit))
}

pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION, HeaderName::from_static(WALLET_HEADER)])
        .max_age(Duration::from_secs(3600))
}

pub fn build_router(context: AppContext) -> Router {
    Router::new()
        .route("/health", get(health::index::handler))
        .nest("/api", api_routes())
        .fallback(fallback::index::handler)
        .layer(DefaultBodyLimit::max(context.body_limit_bytes))
        .layer(Extension(context.db))
        .layer(Extension(context.tmdb))
        .layer(Extension(context.bearer_token))
        .layer(Extension(context.limiter))
        .layer(Extension(context.trusted_proxies))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&context.allowed_origins))
}
