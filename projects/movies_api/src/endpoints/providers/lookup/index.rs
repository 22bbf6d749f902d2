use axum::{
    body::Bytes,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::db::providers::queries::find_cached_links;
use crate::db::{Db, PROVIDERS};
use crate::endpoints::providers::links::{
    normalize_locale, refresh_provider_links, InvalidLocaleError, ResolveProviderLinksError, TmdbSource,
};
use crate::endpoints::providers::list::index::resolve_error_response;
use crate::endpoints::response::json_error;
use interfaces_tmdb_movies::models::ProviderLink;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupBody {
    pub provider_name: Option<String>,
    pub locale: Option<String>,
}

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Invalid movie id")]
    InvalidMovieId,

    #[error("Provider name is required")]
    MissingProviderName,

    #[error(transparent)]
    InvalidLocale {
        #[from]
        source: InvalidLocaleError,
    },

    #[error("Provider {provider} not found for movie {movie_id} in locale {locale}")]
    ProviderNotFound {
        provider: String,
        movie_id: i64,
        locale: String,
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
            HandlerError::InvalidMovieId | HandlerError::MissingProviderName | HandlerError::InvalidLocale { .. } => {
                json_error(StatusCode::BAD_REQUEST, self.to_string())
            }
            HandlerError::ProviderNotFound { .. } => json_error(StatusCode::NOT_FOUND, self.to_string()),
            HandlerError::Resolve { source } => resolve_error_response(source),
        }
    }
}

fn find_link<'a>(links: &'a [ProviderLink], name: &str) -> Option<&'a ProviderLink> {
    links.iter().find(|link| link.name == name)
}

/// Axum handler: POST /api/providers/{movie_id} with `{providerName, locale?}`
///
/// A cache miss on the provider name refreshes the locale from TMDB.
pub async fn handler(
    Extension(db): Extension<Db>,
    Extension(tmdb): Extension<TmdbSource>,
    Path(movie_id): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, HandlerError> {
    let movie_id: i64 = movie_id.trim().parse().map_err(|_| HandlerError::InvalidMovieId)?;
    let body: LookupBody = serde_json::from_slice(&body).unwrap_or_default();
    let provider = body
        .provider_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or(HandlerError::MissingProviderName)?;
    let wanted = provider.to_lowercase();
    let locale = normalize_locale(body.locale.as_deref())?;

    let cached = find_cached_links(&db.catalog(PROVIDERS), movie_id, &locale)
        .await
        .map_err(ResolveProviderLinksError::from)?;
    if let Some(link) = cached.as_deref().and_then(|links| find_link(links, &wanted)) {
        return Ok(Json(json!({ "url": link.url })));
    }

    let fresh = refresh_provider_links(&db, &tmdb, movie_id, &locale).await?;
    match find_link(&fresh, &wanted) {
        Some(link) => Ok(Json(json!({ "url": link.url }))),
        None => Err(HandlerError::ProviderNotFound {
            provider: provider.to_string(),
            movie_id,
            locale,
        }),
    }
}
