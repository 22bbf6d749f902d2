use std::time::Instant;

use axum::{
    extract::{Extension, Request},
    http::{header::AUTHORIZATION, HeaderValue},
    middleware::Next,
    response::Response,
};
use mongodb::bson::DateTime;
use uuid::Uuid;

use crate::db::logs::models::{RequestLog, ResponseLog};
use crate::db::logs::queries::{insert_request_log, insert_response_log};
use crate::db::{Db, LOGS};
use crate::middleware::client::{client_ip, TrustedProxies};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Tags the request with a uuid, traces it, and records request and response
/// entries in `logs`. Log writes run in the background and never fail the request.
pub async fn log_request(
    Extension(db): Extension<Db>,
    Extension(trusted): Extension<TrustedProxies>,
    req: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let request_id = Uuid::new_v4().to_string();
    let request_log = RequestLog {
        kind: "request",
        request_id: request_id.clone(),
        method: req.method().to_string(),
        url: req.uri().to_string(),
        ip: client_ip(&req, &trusted),
        timestamp: DateTime::now(),
        has_authorization: req.headers().contains_key(AUTHORIZATION),
    };
    tracing::info!(
        request_id = %request_id,
        method = %request_log.method,
        url = %request_log.url,
        ip = %request_log.ip,
        "request"
    );

    let logs = db.catalog(LOGS);
    {
        let logs = logs.clone();
        tokio::spawn(async move {
            if let Err(err) = insert_request_log(&logs, &request_log).await {
                tracing::warn!(request_id = %request_log.request_id, error = %err, "request log not stored");
            }
        });
    }

    let mut response = next.run(req).await;

    let duration_ms = i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX);
    let status = response.status().as_u16();
    tracing::info!(request_id = %request_id, status, duration_ms, "response");

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    let response_log = ResponseLog {
        kind: "response",
        request_id,
        status,
        timestamp: DateTime::now(),
        duration_ms,
    };
    tokio::spawn(async move {
        if let Err(err) = insert_response_log(&logs, &response_log).await {
            tracing::warn!(request_id = %response_log.request_id, error = %err, "response log not stored");
        }
    });

    response
}
