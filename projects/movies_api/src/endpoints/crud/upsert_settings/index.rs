use axum::{
    body::Bytes,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::db::documents::queries::{upsert_by_id_field, UpsertDocumentError};
use crate::db::json::{bson_to_json, json_to_document, JsonToDocumentError};
use crate::db::Db;
use crate::endpoints::crud::body::{parse_object_body, ParseObjectBodyError};
use crate::endpoints::response::json_error;
use crate::middleware::validate::{validate_names, InvalidNameError};

const MISSING_ID: &str = "Wallet address (id) is required";

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    InvalidName {
        #[from]
        source: InvalidNameError,
    },

    #[error("ParseBody: {source}")]
    ParseBody {
        #[from]
        source: ParseObjectBodyError,
    },

    #[error("Invalid document: {source}")]
    InvalidDocument {
        #[from]
        source: JsonToDocumentError,
    },

    #[error("UpsertDocument: {source}")]
    UpsertDocument {
        #[from]
        source: UpsertDocumentError,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        match self {
            HandlerError::ParseBody {
                source: ParseObjectBodyError::Empty,
            }
            | HandlerError::UpsertDocument {
                source: UpsertDocumentError::MissingId,
            } => json_error(StatusCode::BAD_REQUEST, MISSING_ID),
            HandlerError::ParseBody { source } => json_error(StatusCode::BAD_REQUEST, source.to_string()),
            HandlerError::InvalidName { .. } | HandlerError::InvalidDocument { .. } => {
                json_error(StatusCode::BAD_REQUEST, self.to_string())
            }
            HandlerError::UpsertDocument { source } => {
                tracing::error!(error = %source, "settings upsert failed");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
            }
        }
    }
}

/// Axum handler: PUT /api/{database}/{collection}
///
/// Upserts a settings document keyed by the body's `id` (a wallet address).
pub async fn handler(
    Extension(db): Extension<Db>,
    Path((database, collection)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<Value>, HandlerError> {
    validate_names(&database, &collection)?;
    let settings = parse_object_body(&body)?;
    let fields = json_to_document(Value::Object(settings.clone()))?;

    let result = upsert_by_id_field(&db.collection(&database, &collection), fields).await?;

    Ok(Json(json!({
        "matchedCount": result.matched_count,
        "modifiedCount": result.modified_count,
        "upsertedId": result.upserted_id.map(bson_to_json).unwrap_or(Value::Null),
        "settings": settings,
    })))
}
