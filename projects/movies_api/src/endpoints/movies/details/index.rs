use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use thiserror::Error;

use crate::db::json::document_to_json;
use crate::db::movies::queries::{find_movie_details, FindMovieDetailsError};
use crate::db::{Db, MOVIES};
use crate::endpoints::response::json_error;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Invalid movie id")]
    InvalidMovieId,

    #[error("Movie not found")]
    MovieNotFound,

    #[error("FindMovieDetails: {source}")]
    FindMovieDetails {
        #[from]
        source: FindMovieDetailsError,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        match self {
            HandlerError::InvalidMovieId => json_error(StatusCode::BAD_REQUEST, self.to_string()),
            HandlerError::MovieNotFound => json_error(StatusCode::NOT_FOUND, self.to_string()),
            HandlerError::FindMovieDetails { source } => {
                tracing::error!(error = %source, "movie details failed");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
            }
        }
    }
}

/// Axum handler: GET /api/movie-details/{id}
pub async fn handler(
    Extension(db): Extension<Db>,
    Path(id): Path<String>,
) -> Result<Json<Value>, HandlerError> {
    let movie_id: i64 = id.trim().parse().map_err(|_| HandlerError::InvalidMovieId)?;

    let movie = find_movie_details(&db.catalog(MOVIES), movie_id)
        .await?
        .ok_or(HandlerError::MovieNotFound)?;
    Ok(Json(document_to_json(movie)))
}
