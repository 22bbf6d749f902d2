use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::users::{is_admin, IsAdminError};
use crate::db::{Db, USERS};
use crate::endpoints::response::json_error;
use crate::middleware::client::wallet_address;

#[derive(Debug, Error)]
pub enum RequireAdminError {
    #[error("No wallet address provided")]
    MissingWallet,

    #[error("Unauthorized: Admin access required")]
    NotAdmin { wallet: String },

    #[error("IsAdmin: {source}")]
    Lookup {
        #[from]
        source: IsAdminError,
    },
}

impl IntoResponse for RequireAdminError {
    fn into_response(self) -> Response {
        match self {
            RequireAdminError::MissingWallet => json_error(StatusCode::UNAUTHORIZED, self.to_string()),
            RequireAdminError::NotAdmin { ref wallet } => {
                tracing::warn!(%wallet, "non-admin ban request");
                json_error(StatusCode::FORBIDDEN, self.to_string())
            }
            RequireAdminError::Lookup { source } => {
                tracing::error!(error = %source, "admin lookup failed");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
            }
        }
    }
}

/// The caller's wallet, when it belongs to an admin user.
pub async fn require_admin(db: &Db, headers: &HeaderMap) -> Result<String, RequireAdminError> {
    let wallet = wallet_address(headers).ok_or(RequireAdminError::MissingWallet)?;
    if !is_admin(&db.catalog(USERS), &wallet).await? {
        return Err(RequireAdminError::NotAdmin { wallet });
    }
    Ok(wallet)
}
