use interfaces_tmdb_movies::index::{TmdbClient, TmdbRequestError};
use interfaces_tmdb_movies::models::{
    filter_excluded_providers, locale_provider_links, ProviderLink, DEFAULT_EXCLUDED_PROVIDERS,
};
use thiserror::Error;

use crate::db::providers::queries::{find_cached_links, store_links, FindCachedLinksError, StoreLinksError};
use crate::db::{Db, PROVIDERS};

pub const DEFAULT_LOCALE: &str = "US";

/// TMDB access for provider lookups; absent when no API key is configured.
#[derive(Debug, Clone, Default)]
pub struct TmdbSource(pub Option<TmdbClient>);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid locale")]
pub struct InvalidLocaleError;

/// Two ASCII letters, uppercased. Missing or blank means `US`.
pub fn normalize_locale(raw: Option<&str>) -> Result<String, InvalidLocaleError> {
    let locale = raw.map(str::trim).filter(|locale| !locale.is_empty()).unwrap_or(DEFAULT_LOCALE);
    if locale.len() == 2 && locale.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(locale.to_ascii_uppercase())
    } else {
        Err(InvalidLocaleError)
    }
}

#[derive(Debug, Error)]
pub enum ResolveProviderLinksError {
    #[error("FindCachedLinks: {source}")]
    FindCached {
        #[from]
        source: FindCachedLinksError,
    },

    #[error("TMDB access is not configured")]
    TmdbNotConfigured,

    #[error("FetchWatchProviders {movie_id}: {source}")]
    Fetch {
        movie_id: i64,
        #[source]
        source: TmdbRequestError,
    },

    #[error("StoreLinks: {source}")]
    Store {
        #[from]
        source: StoreLinksError,
    },
}

/// Cached links for the movie and locale, else fetched from TMDB and cached.
pub async fn resolve_provider_links(
    db: &Db,
    tmdb: &TmdbSource,
    movie_id: i64,
    locale: &str,
) -> Result<Vec<ProviderLink>, ResolveProviderLinksError> {
    let cache = db.catalog(PROVIDERS);
    if let Some(links) = find_cached_links(&cache, movie_id, locale).await? {
        return Ok(links);
    }
    refresh_provider_links(db, tmdb, movie_id, locale).await
}

/// Always asks TMDB, then overwrites the cached links for the locale.
pub async fn refresh_provider_links(
    db: &Db,
    tmdb: &TmdbSource,
    movie_id: i64,
    locale: &str,
) -> Result<Vec<ProviderLink>, ResolveProviderLinksError> {
    let client = tmdb.0.as_ref().ok_or(ResolveProviderLinksError::TmdbNotConfigured)?;
    let mut providers = client
        .fetch_watch_providers(movie_id)
        .await
        .map_err(|source| ResolveProviderLinksError::Fetch { movie_id, source })?;
    filter_excluded_providers(&mut providers, locale, DEFAULT_EXCLUDED_PROVIDERS);

    let links = locale_provider_links(&providers, movie_id, locale);
    store_links(&db.catalog(PROVIDERS), movie_id, locale, &links).await?;
    tracing::info!(movie_id, %locale, links = links.len(), "provider links cached");
    Ok(links)
}
