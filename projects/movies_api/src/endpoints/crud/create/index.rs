use axum::{
    body::Bytes,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use thiserror::Error;

use crate::db::documents::queries::{insert_document, InsertDocumentError};
use crate::db::json::{bson_to_json, json_to_document, JsonToDocumentError};
use crate::db::Db;
use crate::endpoints::crud::body::{parse_object_body, ParseObjectBodyError};
use crate::endpoints::response::json_error;
use crate::middleware::validate::{validate_names, InvalidNameError};

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

    #[error("InsertDocument: {source}")]
    InsertDocument {
        #[from]
        source: InsertDocumentError,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        match self {
            HandlerError::InvalidName { source } => json_error(StatusCode::BAD_REQUEST, source.to_string()),
            HandlerError::ParseBody {
                source: ParseObjectBodyError::Empty,
            } => json_error(StatusCode::BAD_REQUEST, "Request body is required"),
            HandlerError::ParseBody { source } => json_error(StatusCode::BAD_REQUEST, source.to_string()),
            HandlerError::InvalidDocument { .. } => json_error(StatusCode::BAD_REQUEST, self.to_string()),
            HandlerError::InsertDocument { source } => {
                tracing::error!(error = %source, "insert failed");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
            }
        }
    }
}

/// Axum handler: POST /api/{database}/{collection}
pub async fn handler(
    Extension(db): Extension<Db>,
    Path((database, collection)): Path<(String, String)>,
    body: Bytes,
) -> Result<impl IntoResponse, HandlerError> {
    validate_names(&database, &collection)?;
    let object = parse_object_body(&body)?;
    let document = json_to_document(Value::Object(object.clone()))?;

    let inserted_id = insert_document(&db.collection(&database, &collection), &document).await?;
    tracing::info!(%database, %collection, "document inserted");

    let mut created = serde_json::Map::with_capacity(object.len() + 1);
    created.insert("insertedId".to_string(), bson_to_json(inserted_id));
    created.extend(object);
    Ok((StatusCode::CREATED, Json(Value::Object(created))))
}
