use interfaces_tmdb_movies::index::{FetchMovieBundleError, TmdbClient};
use mongodb::bson::Document;
use mongodb::Collection;
use thiserror::Error;
use tracing::{info, warn};

use super::bundle_fields;
use crate::db::json::JsonToDocumentError;
use crate::db::movies::queries::{
    find_movies_missing_details, set_movie_details, FindMoviesMissingDetailsError, SetMovieDetailsError,
};
use crate::db::{Db, MOVIES};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetailsSummary {
    pub candidates: usize,
    pub updated: usize,
    pub skipped: usize,
}

#[derive(Debug, Error)]
pub enum DetailsError {
    #[error("FindMoviesMissingDetails: {source}")]
    FindMoviesMissingDetails {
        #[from]
        source: FindMoviesMissingDetailsError,
    },
}

#[derive(Debug, Error)]
pub enum BackfillMovieError {
    #[error("FetchMovieBundle: {source}")]
    FetchMovieBundle {
        #[from]
        source: FetchMovieBundleError,
    },

    #[error("BuildDetails {movie_id}: {source}")]
    BuildDetails {
        movie_id: i64,
        #[source]
        source: JsonToDocumentError,
    },

    #[error("SetMovieDetails: {source}")]
    SetMovieDetails {
        #[from]
        source: SetMovieDetailsError,
    },
}

/// Backfills movies that lack any of the bundle fields. Movies that cannot be
/// fetched or written are skipped and picked up by the next run.
pub async fn run(db: &Db, tmdb: &TmdbClient) -> Result<DetailsSummary, DetailsError> {
    let movies = db.catalog(MOVIES);
    let movie_ids = find_movies_missing_details(&movies).await?;
    info!(count = movie_ids.len(), "movies missing details");

    let summary = backfill_movies(&movies, tmdb, &movie_ids).await;
    info!(updated = summary.updated, skipped = summary.skipped, "details finished");
    Ok(summary)
}

pub async fn backfill_movies(movies: &Collection<Document>, tmdb: &TmdbClient, movie_ids: &[i64]) -> DetailsSummary {
    let mut summary = DetailsSummary {
        candidates: movie_ids.len(),
        ..DetailsSummary::default()
    };

    for &movie_id in movie_ids {
        match backfill_movie(movies, tmdb, movie_id).await {
            Ok(()) => {
                info!(movie_id, "details updated");
                summary.updated += 1;
            }
            Err(err) => {
                warn!(movie_id, error = %err, "skipping movie");
                summary.skipped += 1;
            }
        }
    }
    summary
}

async fn backfill_movie(movies: &Collection<Document>, tmdb: &TmdbClient, movie_id: i64) -> Result<(), BackfillMovieError> {
    let bundle = tmdb.fetch_movie_bundle(movie_id).await?;
    let fields = bundle_fields(bundle).map_err(|source| BackfillMovieError::BuildDetails { movie_id, source })?;
    set_movie_details(movies, movie_id, fields).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn every_movie_is_attempted_when_writes_fail() {
        let db = Db::connect("mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=200", "movies")
            .await
            .unwrap();
        let mut server = mockito::Server::new_async().await;
        let details = server
            .mock("GET", Matcher::Regex(r"^/movie/\d+$".into()))
            .match_query(Matcher::Any)
            .with_body(r#"{"runtime":90}"#)
            .expect(2)
            .create_async()
            .await;
        let _credits = server
            .mock("GET", Matcher::Regex(r"^/movie/\d+/credits$".into()))
            .match_query(Matcher::Any)
            .with_body(r#"{"cast":[],"crew":[]}"#)
            .create_async()
            .await;
        let _providers = server
            .mock("GET", Matcher::Regex(r"^/movie/\d+/watch/providers$".into()))
            .match_query(Matcher::Any)
            .with_body(r#"{"results":{}}"#)
            .create_async()
            .await;
        let _keywords = server
            .mock("GET", Matcher::Regex(r"^/movie/\d+/keywords$".into()))
            .match_query(Matcher::Any)
            .with_body(r#"{"keywords":[]}"#)
            .create_async()
            .await;

        let tmdb = TmdbClient::new("test-key", server.url());
        let summary = backfill_movies(&db.catalog(MOVIES), &tmdb, &[5, 6]).await;

        details.assert_async().await;
        assert_eq!(
            summary,
            DetailsSummary {
                candidates: 2,
                updated: 0,
                skipped: 2,
            }
        );
    }
}
