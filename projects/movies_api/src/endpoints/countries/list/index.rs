use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::db::json::bson_to_json;
use crate::db::movies::queries::{distinct_origin_countries, DistinctOriginCountriesError};
use crate::db::{Db, MOVIES};
use crate::endpoints::response::json_error;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("DistinctOriginCountries: {source}")]
    DistinctOriginCountries {
        #[from]
        source: DistinctOriginCountriesError,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "countries failed");
        json_error(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
    }
}

/// Axum handler: GET /api/countries
pub async fn handler(Extension(db): Extension<Db>) -> Result<Json<Value>, HandlerError> {
    let countries = distinct_origin_countries(&db.catalog(MOVIES)).await?;
    let countries: Vec<Value> = countries.into_iter().map(bson_to_json).collect();
    Ok(Json(json!({ "countries": countries })))
}
