use std::time::Duration;

use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::Collection;
use thiserror::Error;

use crate::db::documents::queries::{aggregate_documents, AggregateDocumentsError, AggregateLimits};
use crate::db::timestamps::{now_utc_string, update_with_timestamps, upsert_with_timestamps};
use crate::pipelines::catalog::{movies_with_actors, movies_with_actors_count, CardFilter};
use crate::pipelines::countries::distinct_countries;
use crate::pipelines::details::movie_details;

/// Fields the loaders attach to each discovered movie.
pub const DETAIL_FIELDS: [&str; 4] = ["fullDetails", "credits", "providers", "keywords"];

const COUNTRIES_MAX_TIME: Duration = Duration::from_secs(60);

pub fn missing_details_filter() -> Document {
    let branches: Vec<Bson> = DETAIL_FIELDS
        .iter()
        .map(|field| {
            let mut branch = Document::new();
            branch.insert(*field, doc! { "$exists": false });
            Bson::Document(branch)
        })
        .collect();
    doc! { "$or": branches }
}

#[derive(Debug, Error)]
pub enum FindMoviesMissingDetailsError {
    #[error("FindMovies: {source}")]
    FindMovies {
        #[source]
        source: mongodb::error::Error,
    },

    #[error("CollectMovies: {source}")]
    CollectMovies {
        #[source]
        source: mongodb::error::Error,
    },
}

/// TMDB ids of movies lacking at least one of [`DETAIL_FIELDS`].
pub async fn find_movies_missing_details(
    coll: &Collection<Document>,
) -> Result<Vec<i64>, FindMoviesMissingDetailsError> {
    let cursor = coll
        .find(missing_details_filter())
        .projection(doc! { "_id": 0, "id": 1 })
        .await
        .map_err(|source| FindMoviesMissingDetailsError::FindMovies { source })?;

    let documents: Vec<Document> = cursor
        .try_collect()
        .await
        .map_err(|source| FindMoviesMissingDetailsError::CollectMovies { source })?;

    Ok(documents.iter().filter_map(movie_id).collect())
}

/// `id` as stored by the loaders; TMDB ids may come back as Int32 or Int64.
pub fn movie_id(document: &Document) -> Option<i64> {
    match document.get("id")? {
        Bson::Int32(id) => Some(i64::from(*id)),
        Bson::Int64(id) => Some(*id),
        Bson::Double(id) if id.fract() == 0.0 => Some(*id as i64),
        _ => None,
    }
}

#[derive(Debug, Error)]
pub enum SetMovieDetailsError {
    #[error("SetMovieDetails {movie_id}: {source}")]
    Update {
        movie_id: i64,
        #[source]
        source: mongodb::error::Error,
    },
}

pub async fn set_movie_details(
    coll: &Collection<Document>,
    movie_id: i64,
    fields: Document,
) -> Result<(), SetMovieDetailsError> {
    coll.update_one(doc! { "id": movie_id }, update_with_timestamps(fields, &now_utc_string()))
        .await
        .map_err(|source| SetMovieDetailsError::Update { movie_id, source })?;
    Ok(())
}

#[derive(Debug, Error)]
pub enum UpsertMovieError {
    #[error("UpsertMovie {movie_id}: {source}")]
    Upsert {
        movie_id: i64,
        #[source]
        source: mongodb::error::Error,
    },
}

/// Upserts a discovered movie on its TMDB `id`, stamping `lastUpdated`.
pub async fn upsert_movie(
    coll: &Collection<Document>,
    movie_id: i64,
    mut movie: Document,
) -> Result<(), UpsertMovieError> {
    let now = now_utc_string();
    movie.insert("id", movie_id);
    movie.insert("lastUpdated", now.as_str());

    coll.update_one(doc! { "id": movie_id }, upsert_with_timestamps(movie, &now))
        .upsert(true)
        .await
        .map_err(|source| UpsertMovieError::Upsert { movie_id, source })?;
    Ok(())
}

#[derive(Debug, Error)]
pub enum MoviesWithActorsPageError {
    #[error("MoviesWithActorsPage: {source}")]
    Aggregate {
        #[from]
        source: AggregateDocumentsError,
    },
}

pub async fn movies_with_actors_page(
    coll: &Collection<Document>,
    filter: &CardFilter,
    skip: u64,
    limit: i64,
) -> Result<Vec<Document>, MoviesWithActorsPageError> {
    let pipeline = movies_with_actors(filter, skip, limit);
    Ok(aggregate_documents(coll, pipeline, AggregateLimits::default()).await?)
}

#[derive(Debug, Error)]
pub enum CountMoviesWithActorsError {
    #[error("CountMoviesWithActors: {source}")]
    Aggregate {
        #[from]
        source: AggregateDocumentsError,
    },
}

pub async fn count_movies_with_actors(
    coll: &Collection<Document>,
    filter: &CardFilter,
) -> Result<u64, CountMoviesWithActorsError> {
    let pipeline = movies_with_actors_count(filter);
    let documents = aggregate_documents(coll, pipeline, AggregateLimits::default()).await?;
    Ok(documents.first().map_or(0, count_total))
}

fn count_total(document: &Document) -> u64 {
    match document.get("total") {
        Some(Bson::Int32(total)) => u64::try_from(*total).unwrap_or(0),
        Some(Bson::Int64(total)) => u64::try_from(*total).unwrap_or(0),
        _ => 0,
    }
}

#[derive(Debug, Error)]
pub enum FindMovieDetailsError {
    #[error("FindMovieDetails {movie_id}: {source}")]
    Aggregate {
        movie_id: i64,
        #[source]
        source: AggregateDocumentsError,
    },
}

pub async fn find_movie_details(
    coll: &Collection<Document>,
    movie_id: i64,
) -> Result<Option<Document>, FindMovieDetailsError> {
    let documents = aggregate_documents(coll, movie_details(movie_id), AggregateLimits::default())
        .await
        .map_err(|source| FindMovieDetailsError::Aggregate { movie_id, source })?;
    Ok(documents.into_iter().next())
}

#[derive(Debug, Error)]
pub enum DistinctOriginCountriesError {
    #[error("DistinctOriginCountries: {source}")]
    Aggregate {
        #[from]
        source: AggregateDocumentsError,
    },
}

pub async fn distinct_origin_countries(
    coll: &Collection<Document>,
) -> Result<Vec<Bson>, DistinctOriginCountriesError> {
    let limits = AggregateLimits {
        max_time: Some(COUNTRIES_MAX_TIME),
        allow_disk_use: true,
    };
    let documents = aggregate_documents(coll, distinct_countries(), limits).await?;
    Ok(documents
        .first()
        .and_then(|document| document.get_array("countries").ok())
        .cloned()
        .unwrap_or_default())
}
