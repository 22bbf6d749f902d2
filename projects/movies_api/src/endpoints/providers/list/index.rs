use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::db::Db;
use crate::endpoints::providers::links::{
    normalize_locale, resolve_provider_links, InvalidLocaleError, ResolveProviderLinksError, TmdbSource,
};
use crate::endpoints::response::json_error;

#[derive(Debug, Default, Deserialize)]
pub struct ProvidersQuery {
    pub locale: Option<String>,
}

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Invalid movie id")]
    InvalidMovieId,

    #[error(transparent)]
    InvalidLocale {
        #[from]
        source: InvalidLocaleError,
    },

    #[error("ResolveProviderLinks: {source}")]
    Resolve {
        #[from]
        source: ResolveProviderLinksError,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        match self {
            HandlerError::InvalidMovieId | HandlerError::InvalidLocale { .. } => {
                json_error(StatusCode::BAD_REQUEST, self.to_string())
            }
            HandlerError::Resolve { source } => resolve_error_response(source),
        }
    }
}

/// Shared by both provider handlers.
pub fn resolve_error_response(source: ResolveProviderLinksError) -> Response {
    tracing::error!(error = %source, "provider lookup failed");
    match source {
        ResolveProviderLinksError::Fetch { .. } => json_error(StatusCode::BAD_GATEWAY, "Provider lookup failed"),
        _ => json_error(StatusCode::INTERNAL_SERVER_ERROR, "Server error"),
    }
}

/// Axum handler: GET /api/providers/{movie_id}?locale=US
pub async fn handler(
    Extension(db): Extension<Db>,
    Extension(tmdb): Extension<TmdbSource>,
    Path(movie_id): Path<String>,
    Query(query): Query<ProvidersQuery>,
) -> Result<Json<Value>, HandlerError> {
    let movie_id: i64 = movie_id.trim().parse().map_err(|_| HandlerError::InvalidMovieId)?;
    let locale = normalize_locale(query.locale.as_deref())?;

    let links = resolve_provider_links(&db, &tmdb, movie_id, &locale).await?;
    Ok(Json(json!({ "providers": links })))
}
