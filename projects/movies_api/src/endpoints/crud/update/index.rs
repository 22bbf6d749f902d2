use axum::{
    body::Bytes,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::db::documents::queries::{update_document, UpdateDocumentError};
use crate::db::json::{json_to_document, JsonToDocumentError};
use crate::db::keys::DocumentKey;
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

    #[error("Document not found")]
    NotFound,

    #[error("UpdateDocument: {source}")]
    UpdateDocument {
        #[from]
        source: UpdateDocumentError,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        match self {
            HandlerError::ParseBody {
                source: ParseObjectBodyError::Empty,
            } => json_error(StatusCode::BAD_REQUEST, "Update data is required"),
            HandlerError::ParseBody { source } => json_error(StatusCode::BAD_REQUEST, source.to_string()),
            HandlerError::InvalidName { .. } | HandlerError::InvalidDocument { .. } => {
                json_error(StatusCode::BAD_REQUEST, self.to_string())
            }
            HandlerError::NotFound => json_error(StatusCode::NOT_FOUND, self.to_string()),
            HandlerError::UpdateDocument { source } => {
                tracing::error!(error = %source, "update failed");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
            }
        }
    }
}

/// Axum handler: PUT /api/{database}/{collection}/{id}
pub async fn handler(
    Extension(db): Extension<Db>,
    Path((database, collection, id)): Path<(String, String, String)>,
    body: Bytes,
) -> Result<Json<Value>, HandlerError> {
    validate_names(&database, &collection)?;
    let key = DocumentKey::parse(&id);
    let fields = json_to_document(Value::Object(parse_object_body(&body)?))?;

    let result = update_document(&db.collection(&database, &collection), key.filter(), fields).await?;
    if result.matched_count == 0 {
        return Err(HandlerError::NotFound);
    }

    Ok(Json(json!({
        "modified": result.modified_count > 0,
        "matchedCount": result.matched_count,
        "modifiedCount": result.modified_count,
    })))
}
