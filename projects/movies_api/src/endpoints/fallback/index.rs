use axum::{http::StatusCode, response::Response};

use crate::endpoints::response::json_error;

pub async fn handler() -> Response {
    json_error(StatusCode::NOT_FOUND, "Not found")
}
