//! HTTP behaviour of the router that does not need a live MongoDB.

mod common;

use std::net::SocketAddr;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, build_test_app, from_peer, get, get_with_token, send, test_context, TOKEN};
use projects_movies_api::middleware::client::TrustedProxies;
use projects_movies_api::router::build_router;
use tower::ServiceExt;

#[tokio::test]
async fn health_is_public() {
    let response = get(build_test_app().await, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "OK");
    assert!(json["time"].is_string());
}

#[tokio::test]
async fn unknown_route_returns_json_404() {
    let response = get(build_test_app().await, "/nope").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Not found");
}

#[tokio::test]
async fn api_requires_a_token() {
    let response = get(build_test_app().await, "/api/countries").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "No token provided");
}

#[tokio::test]
async fn api_rejects_a_wrong_token() {
    let response = get_with_token(build_test_app().await, "/api/countries", "wrong").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Invalid token");
}

#[tokio::test]
async fn ban_check_failure_is_a_500() {
    let response = get_with_token(build_test_app().await, "/api/countries", TOKEN).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await["error"],
        "Internal server error during ban check"
    );
}

#[tokio::test]
async fn rate_limit_applies_before_auth() {
    let app = build_router(test_context(1).await);

    let first = app
        .clone()
        .oneshot(Request::get("/api/countries").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::UNAUTHORIZED);

    let second = get(app, "/api/countries").await;
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body_json(second).await["error"], "Too many requests");
}

#[tokio::test]
async fn forwarded_for_does_not_reset_the_budget() {
    let app = build_router(test_context(1).await);
    let peer = SocketAddr::from(([198, 51, 100, 7], 50_000));

    let mut limited = 0;
    for n in 0..20 {
        let request = Request::get("/api/countries")
            .header("x-forwarded-for", format!("203.0.113.{n}"))
            .body(Body::empty())
            .unwrap();
        let response = send(app.clone(), from_peer(request, peer)).await;
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            limited += 1;
        }
    }

    assert_eq!(limited, 19);
}

#[tokio::test]
async fn trusted_proxy_forwards_client_addresses() {
    let proxy = SocketAddr::from(([10, 0, 0, 1], 50_000));
    let mut context = test_context(1).await;
    context.trusted_proxies = TrustedProxies::new(vec![proxy.ip()]);
    let app = build_router(context);

    for ip in ["203.0.113.1", "203.0.113.2"] {
        let request = Request::get("/api/countries")
            .header("x-forwarded-for", ip)
            .body(Body::empty())
            .unwrap();
        let response = send(app.clone(), from_peer(request, proxy)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "client {ip}");
    }

    let repeat = Request::get("/api/countries")
        .header("x-forwarded-for", "203.0.113.1")
        .body(Body::empty())
        .unwrap();
    let response = send(app, from_peer(repeat, proxy)).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn security_headers_are_set() {
    let response = get(build_test_app().await, "/health").await;
    let headers = response.headers();

    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert_eq!(headers["referrer-policy"], "no-referrer");
}

#[tokio::test]
async fn cors_preflight_allows_any_origin_by_default() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/countries")
        .header("origin", "https://client.example")
        .header("access-control-request-method", "GET")
        .body(Body::empty())
        .unwrap();

    let response = send(build_test_app().await, request).await;

    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn cors_respects_configured_origins() {
    let mut context = test_context(100).await;
    context.allowed_origins = vec!["https://client.example".to_string()];
    let app = build_router(context);

    let request = Request::get("/health")
        .header("origin", "https://client.example")
        .body(Body::empty())
        .unwrap();
    let response = send(app, request).await;

    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "https://client.example"
    );
}
