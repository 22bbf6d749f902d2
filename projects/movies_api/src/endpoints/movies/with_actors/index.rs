use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::db::json::documents_to_json;
use crate::db::movies::queries::{
    count_movies_with_actors, movies_with_actors_page, CountMoviesWithActorsError, MoviesWithActorsPageError,
};
use crate::db::{Db, MOVIES};
use crate::endpoints::response::json_error;
use crate::pipelines::catalog::CardFilter;
use crate::pipelines::today_iso_date;

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Default, Deserialize)]
pub struct CardsQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub country: Option<String>,
}

/// Page numbers are 1-based; unparsable or zero values fall back to defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
}

impl Pagination {
    pub fn from_query(query: &CardsQuery) -> Self {
        let positive = |raw: Option<&str>| raw.and_then(|value| value.trim().parse::<u64>().ok()).filter(|value| *value > 0);
        Self {
            page: positive(query.page.as_deref()).unwrap_or(1),
            limit: positive(query.limit.as_deref())
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .min(MAX_PAGE_SIZE),
        }
    }

    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit)
    }
}

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("MoviesWithActorsPage: {source}")]
    Page {
        #[from]
        source: MoviesWithActorsPageError,
    },

    #[error("CountMoviesWithActors: {source}")]
    Count {
        #[from]
        source: CountMoviesWithActorsError,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "movie cards failed");
        json_error(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
    }
}

/// Axum handler: GET /api/movies-with-actors
pub async fn handler(
    Extension(db): Extension<Db>,
    Query(query): Query<CardsQuery>,
) -> Result<Json<Value>, HandlerError> {
    let pagination = Pagination::from_query(&query);
    let filter = CardFilter::new(query.country.as_deref(), today_iso_date());
    let movies = db.catalog(MOVIES);

    let (results, total) = tokio::try_join!(
        async {
            movies_with_actors_page(&movies, &filter, pagination.skip(), pagination.limit as i64)
                .await
                .map_err(HandlerError::from)
        },
        async {
            count_movies_with_actors(&movies, &filter)
                .await
                .map_err(HandlerError::from)
        },
    )?;

    Ok(Json(json!({
        "results": documents_to_json(results),
        "total": total,
        "page": pagination.page,
        "total_pages": pagination.total_pages(total),
    })))
}
