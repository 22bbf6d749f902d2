use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::db::documents::queries::{delete_document, DeleteDocumentError};
use crate::db::keys::DocumentKey;
use crate::db::Db;
use crate::endpoints::response::json_error;
use crate::middleware::validate::{validate_names, InvalidNameError};

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    InvalidName {
        #[from]
        source: InvalidNameError,
    },

    #[error("Document not found")]
    NotFound,

    #[error("DeleteDocument: {source}")]
    DeleteDocument {
        #[from]
        source: DeleteDocumentError,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        match self {
            HandlerError::InvalidName { source } => json_error(StatusCode::BAD_REQUEST, source.to_string()),
            HandlerError::NotFound => json_error(StatusCode::NOT_FOUND, "Document not found"),
            HandlerError::DeleteDocument { source } => {
                tracing::error!(error = %source, "delete failed");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
            }
        }
    }
}

/// Axum handler: DELETE /api/{database}/{collection}/{id}
pub async fn handler(
    Extension(db): Extension<Db>,
    Path((database, collection, id)): Path<(String, String, String)>,
) -> Result<Json<Value>, HandlerError> {
    validate_names(&database, &collection)?;
    let key = DocumentKey::parse(&id);

    let deleted = delete_document(&db.collection(&database, &collection), key.filter()).await?;
    if deleted == 0 {
        return Err(HandlerError::NotFound);
    }

    tracing::info!(%database, %collection, %key, "document deleted");
    Ok(Json(json!({ "deletedCount": deleted })))
}
