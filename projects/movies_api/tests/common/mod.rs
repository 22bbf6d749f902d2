#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, Response};
use axum::{Extension, Router};
use http_body_util::BodyExt;
use projects_movies_api::db::Db;
use projects_movies_api::endpoints::providers::links::TmdbSource;
use projects_movies_api::middleware::auth::BearerToken;
use projects_movies_api::middleware::client::TrustedProxies;
use projects_movies_api::middleware::rate_limit::RateLimiter;
use projects_movies_api::router::{api_handlers, build_router, AppContext};
use serde_json::Value;
use tower::ServiceExt;

pub const TOKEN: &str = "test-token";

/// Nothing listens on port 1, so any query fails fast once server selection
/// times out. Routes that never reach MongoDB behave normally.
pub const UNREACHABLE_MONGO: &str = "mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=200";

pub async fn test_context(max_requests: u32) -> AppContext {
    AppContext {
        db: Db::connect(UNREACHABLE_MONGO, "movies").await.unwrap(),
        tmdb: TmdbSource(None),
        bearer_token: BearerToken::new(TOKEN),
        limiter: RateLimiter::new(Duration::from_secs(60), max_requests),
        trusted_proxies: TrustedProxies::default(),
        allowed_origins: Vec::new(),
        body_limit_bytes: 1024,
    }
}

pub async fn build_test_app() -> Router {
    build_router(test_context(100).await)
}

/// The `/api` handlers with their extensions but no middleware, so validation
/// paths can be exercised without MongoDB.
pub async fn build_handler_app() -> Router {
    let context = test_context(100).await;
    Router::new()
        .nest("/api", api_handlers())
        .layer(Extension(context.db))
        .layer(Extension(context.tmdb))
}

/// Attaches the connection info `axum::serve` would provide.
pub fn from_peer(mut request: Request<Body>, peer: SocketAddr) -> Request<Body> {
    request.extensions_mut().insert(ConnectInfo(peer));
    request
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn get_with_token(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::get(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
