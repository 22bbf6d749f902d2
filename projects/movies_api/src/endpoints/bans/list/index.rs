use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use thiserror::Error;

use crate::db::bans::queries::{list_bans, ListBansError};
use crate::db::json::documents_to_json;
use crate::db::{Db, BANS};
use crate::endpoints::bans::admin::{require_admin, RequireAdminError};
use crate::endpoints::response::json_error;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Admin {
        #[from]
        source: RequireAdminError,
    },

    #[error("ListBans: {source}")]
    ListBans {
        #[from]
        source: ListBansError,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        match self {
            HandlerError::Admin { source } => source.into_response(),
            HandlerError::ListBans { source } => {
                tracing::error!(error = %source, "ban list failed");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
            }
        }
    }
}

/// Axum handler: GET /api/bans, newest first.
pub async fn handler(Extension(db): Extension<Db>, headers: HeaderMap) -> Result<Json<Value>, HandlerError> {
    require_admin(&db, &headers).await?;
    let bans = list_bans(&db.catalog(BANS)).await?;
    Ok(Json(documents_to_json(bans)))
}
