use mongodb::bson::{doc, Document};
use mongodb::Collection;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IsAdminError {
    #[error("FindUser: {source}")]
    FindUser {
        #[from]
        source: mongodb::error::Error,
    },
}

/// A wallet is an admin when its user document has `is_admin: true`.
pub async fn is_admin(coll: &Collection<Document>, wallet: &str) -> Result<bool, IsAdminError> {
    let user = coll
        .find_one(doc! { "id": wallet })
        .await
        .map_err(|source| IsAdminError::FindUser { source })?;

    Ok(user.as_ref().is_some_and(user_is_admin))
}

fn user_is_admin(user: &Document) -> bool {
    user.get_bool("is_admin").unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_boolean_true_grants_admin() {
        assert!(user_is_admin(&doc! { "id": "0xa", "is_admin": true }));
        assert!(!user_is_admin(&doc! { "id": "0xa", "is_admin": false }));
        assert!(!user_is_admin(&doc! { "id": "0xa", "is_admin": "yes" }));
        assert!(!user_is_admin(&doc! { "id": "0xa" }));
    }
}
