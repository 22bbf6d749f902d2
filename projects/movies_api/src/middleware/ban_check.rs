use axum::{
    extract::{Extension, Request},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::bans::queries::{find_matching_ban, FindMatchingBanError};
use crate::db::{Db, BANS};
use crate::endpoints::response::json_error;
use crate::middleware::client::{client_ip, wallet_address, TrustedProxies};

#[derive(Debug, Error)]
pub enum BanCheckError {
    #[error("Access denied: {ban_type} is banned")]
    Banned { ban_type: String },

    #[error("FindMatchingBan: {source}")]
    Lookup {
        #[from]
        source: FindMatchingBanError,
    },
}

impl IntoResponse for BanCheckError {
    fn into_response(self) -> Response {
        match self {
            BanCheckError::Banned { .. } => json_error(StatusCode::FORBIDDEN, self.to_string()),
            BanCheckError::Lookup { source } => {
                tracing::error!(error = %source, "ban check failed");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error during ban check")
            }
        }
    }
}

/// Rejects callers whose address or wallet has a ban on record.
pub async fn reject_banned(
    Extension(db): Extension<Db>,
    Extension(trusted): Extension<TrustedProxies>,
    req: Request,
    next: Next,
) -> Result<Response, BanCheckError> {
    let ip = client_ip(&req, &trusted);
    let wallet = wallet_address(req.headers());

    if let Some(ban) = find_matching_ban(&db.catalog(BANS), &ip, wallet.as_deref()).await? {
        let ban_type = ban.get_str("type").unwrap_or("client").to_string();
        tracing::warn!(%ip, wallet = wallet.as_deref(), %ban_type, "banned caller rejected");
        return Err(BanCheckError::Banned { ban_type });
    }

    Ok(next.run(req).await)
}
