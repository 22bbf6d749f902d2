use std::sync::Arc;

use axum::{
    extract::{Extension, Request},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::endpoints::response::json_error;

/// The static token every `/api` caller must present.
#[derive(Debug, Clone)]
pub struct BearerToken(Arc<str>);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Arc::from(token.into()))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("No token provided")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        json_error(StatusCode::UNAUTHORIZED, self.to_string())
    }
}

pub fn check_bearer(headers: &HeaderMap, expected: &BearerToken) -> Result<(), AuthError> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingToken)?;

    if token != &*expected.0 {
        return Err(AuthError::InvalidToken);
    }
    Ok(())
}

pub async fn require_bearer(
    Extension(expected): Extension<BearerToken>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    check_bearer(req.headers(), &expected)?;
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn accepts_matching_token() {
        let expected = BearerToken::new("secret");
        assert_eq!(check_bearer(&headers("Bearer secret"), &expected), Ok(()));
    }

    #[test]
    fn rejects_missing_or_malformed_header() {
        let expected = BearerToken::new("secret");
        assert_eq!(check_bearer(&HeaderMap::new(), &expected), Err(AuthError::MissingToken));
        assert_eq!(check_bearer(&headers("Basic secret"), &expected), Err(AuthError::MissingToken));
        assert_eq!(check_bearer(&headers("Bearer "), &expected), Err(AuthError::MissingToken));
    }

    #[test]
    fn rejects_wrong_token() {
        let expected = BearerToken::new("secret");
        assert_eq!(check_bearer(&headers("Bearer nope"), &expected), Err(AuthError::InvalidToken));
    }

    #[test]
    fn token_must_be_the_whole_remainder() {
        let expected = BearerToken::new("secret");
        assert_eq!(check_bearer(&headers("Bearer  secret"), &expected), Err(AuthError::InvalidToken));
        assert_eq!(check_bearer(&headers("Bearer secret junk"), &expected), Err(AuthError::InvalidToken));
        assert_eq!(check_bearer(&headers("Bearer secret "), &expected), Err(AuthError::InvalidToken));
    }
}
