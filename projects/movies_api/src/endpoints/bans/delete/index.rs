use axum::{
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use mongodb::bson::oid::ObjectId;
use serde_json::{json, Value};
use thiserror::Error;

use crate::db::bans::queries::{delete_ban, DeleteBanError};
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

    #[error("Invalid ban id")]
    InvalidBanId,

    #[error("Ban not found")]
    BanNotFound,

    #[error("DeleteBan: {source}")]
    DeleteBan {
        #[from]
        source: DeleteBanError,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        match self {
            HandlerError::Admin { source } => source.into_response(),
            HandlerError::InvalidBanId => json_error(StatusCode::BAD_REQUEST, self.to_string()),
            HandlerError::BanNotFound => json_error(StatusCode::NOT_FOUND, self.to_string()),
            HandlerError::DeleteBan { source } => {
                tracing::error!(error = %source, "ban delete failed");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
            }
        }
    }
}

/// Axum handler: DELETE /api/bans/{id}
pub async fn handler(
    Extension(db): Extension<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>, HandlerError> {
    let admin = require_admin(&db, &headers).await?;
    let id = ObjectId::parse_str(id.trim()).map_err(|_| HandlerError::InvalidBanId)?;

    let deleted = delete_ban(&db.catalog(BANS), id).await?;
    if deleted == 0 {
        return Err(HandlerError::BanNotFound);
    }

    tracing::info!(ban_id = %id, removed_by = %admin, "ban removed");
    Ok(Json(json!({ "deletedCount": deleted })))
}
