use axum::{
    body::Bytes,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use mongodb::bson::DateTime;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::db::bans::models::{Ban, BanType, InvalidBanType, NewBan};
use crate::db::bans::queries::{insert_ban, InsertBanError};
use crate::db::{Db, BANS};
use crate::endpoints::bans::admin::{require_admin, RequireAdminError};
use crate::endpoints::response::json_error;

#[derive(Debug, Default, Deserialize)]
pub struct CreateBanBody {
    #[serde(rename = "type")]
    pub ban_type: Option<String>,
    pub value: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Admin {
        #[from]
        source: RequireAdminError,
    },

    #[error("Type and value are required")]
    MissingFields,

    #[error(transparent)]
    InvalidType {
        #[from]
        source: InvalidBanType,
    },

    #[error("InsertBan: {source}")]
    InsertBan {
        #[from]
        source: InsertBanError,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        match self {
            HandlerError::Admin { source } => source.into_response(),
            HandlerError::MissingFields | HandlerError::InvalidType { .. } => {
                json_error(StatusCode::BAD_REQUEST, self.to_string())
            }
            HandlerError::InsertBan { source } => {
                tracing::error!(error = %source, "ban insert failed");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
            }
        }
    }
}

pub fn ban_to_json(ban: &Ban) -> Value {
    json!({
        "insertedId": ban.id.map(|id| id.to_hex()),
        "type": ban.ban_type.as_str(),
        "value": ban.value,
        "reason": ban.reason,
        "bannedAt": ban
            .banned_at
            .try_to_rfc3339_string()
            .unwrap_or_else(|_| ban.banned_at.timestamp_millis().to_string()),
        "bannedBy": ban.banned_by,
    })
}

/// Axum handler: POST /api/bans with `{type, value, reason?}`
pub async fn handler(
    Extension(db): Extension<Db>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, HandlerError> {
    let admin = require_admin(&db, &headers).await?;

    let body: CreateBanBody = serde_json::from_slice(&body).unwrap_or_default();
    let (Some(ban_type), Some(value)) = (
        body.ban_type.as_deref().map(str::trim).filter(|raw| !raw.is_empty()),
        body.value.as_deref().map(str::trim).filter(|raw| !raw.is_empty()),
    ) else {
        return Err(HandlerError::MissingFields);
    };
    let ban_type: BanType = ban_type.parse()?;

    let ban = NewBan {
        ban_type,
        value,
        reason: body.reason.as_deref(),
        banned_by: &admin,
    }
    .into_ban(DateTime::now());
    let ban = insert_ban(&db.catalog(BANS), ban).await?;
    tracing::info!(%ban_type, value = %ban.value, banned_by = %admin, "ban created");

    Ok((StatusCode::CREATED, Json(ban_to_json(&ban))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ban_json_uses_wire_names() {
        let ban = NewBan {
            ban_type: BanType::Ip,
            value: "10.0.0.7",
            reason: None,
            banned_by: "0xadmin",
        }
        .into_ban(DateTime::from_millis(0));
        let json = ban_to_json(&ban);

        assert_eq!(json["type"], "ip");
        assert_eq!(json["reason"], "No reason provided");
        assert_eq!(json["bannedBy"], "0xadmin");
        assert_eq!(json["bannedAt"], "1970-01-01T00:00:00Z");
        assert!(json["insertedId"].is_null());
    }
}
