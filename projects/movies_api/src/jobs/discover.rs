use interfaces_tmdb_movies::index::{FetchMovieBundleError, TmdbClient};
use interfaces_tmdb_movies::models::{DiscoverPage, MovieBundle};
use mongodb::bson::Document;
use mongodb::Collection;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use super::bundle_fields;
use crate::db::json::{json_to_document, JsonToDocumentError};
use crate::db::movies::queries::{upsert_movie, UpsertMovieError};
use crate::db::{Db, MOVIES};

#[derive(Debug, Clone, Copy)]
pub struct DiscoverLimits {
    /// Movies taken from the head of each page.
    pub batch_size: usize,
    pub max_pages: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiscoverSummary {
    pub pages: u32,
    pub stored: usize,
    pub skipped: usize,
}

#[derive(Debug, Error)]
pub enum StoreMovieError {
    #[error("Discover result has no id")]
    MissingId,

    #[error("FetchMovieBundle: {source}")]
    FetchMovieBundle {
        #[from]
        source: FetchMovieBundleError,
    },

    #[error("BuildMovieDocument {movie_id}: {source}")]
    BuildMovieDocument {
        movie_id: i64,
        #[source]
        source: JsonToDocumentError,
    },

    #[error("UpsertMovie: {source}")]
    UpsertMovie {
        #[from]
        source: UpsertMovieError,
    },
}

/// Walks `/discover/movie` by popularity and upserts every movie with its details,
/// credits, providers and keywords. A page that fails or comes back empty ends the
/// run; a movie that cannot be fetched or stored is logged and skipped.
pub async fn run(db: &Db, tmdb: &TmdbClient, limits: DiscoverLimits) -> DiscoverSummary {
    let movies = db.catalog(MOVIES);
    let mut summary = DiscoverSummary::default();
    let mut page = 1;
    let mut total_pages = 1;

    while page <= total_pages && page <= limits.max_pages {
        info!(page, total_pages, "fetching discover page");
        let discovered = tmdb.fetch_discover_page(page).await.unwrap_or_else(|err| {
            warn!(error = %err, "discover page failed");
            DiscoverPage::default()
        });
        total_pages = discovered.total_pages.min(limits.max_pages);

        if discovered.results.is_empty() {
            info!(page, "no more movies, stopping");
            break;
        }

        let batch: Vec<Value> = discovered.results.into_iter().take(limits.batch_size).collect();
        info!(page, count = batch.len(), "processing movies");
        for movie in batch {
            match store_movie(&movies, tmdb, movie).await {
                Ok(movie_id) => {
                    tracing::debug!(movie_id, "movie stored");
                    summary.stored += 1;
                }
                Err(err) => {
                    warn!(error = %err, "skipping movie");
                    summary.skipped += 1;
                }
            }
        }

        summary.pages = page;
        page += 1;
    }

    info!(pages = summary.pages, stored = summary.stored, skipped = summary.skipped, "discover finished");
    summary
}

async fn store_movie(movies: &Collection<Document>, tmdb: &TmdbClient, movie: Value) -> Result<i64, StoreMovieError> {
    let movie_id = movie
        .get("id")
        .and_then(Value::as_i64)
        .ok_or(StoreMovieError::MissingId)?;
    let bundle = tmdb.fetch_movie_bundle(movie_id).await?;
    let document = discovered_movie(movie, bundle)
        .map_err(|source| StoreMovieError::BuildMovieDocument { movie_id, source })?;
    upsert_movie(movies, movie_id, document).await?;
    Ok(movie_id)
}

/// The discover summary with the bundle fields layered on top.
pub fn discovered_movie(movie: Value, bundle: MovieBundle) -> Result<Document, JsonToDocumentError> {
    let mut document = json_to_document(movie)?;
    for (field, value) in bundle_fields(bundle)? {
        document.insert(field, value);
    }
    Ok(document)
}
