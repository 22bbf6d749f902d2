use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, to_document, Bson, Document};
use mongodb::Collection;
use thiserror::Error;

use crate::db::bans::models::{Ban, BanType};

/// Matches an ip ban for `ip`, or a wallet ban for `wallet` when one is supplied.
pub fn ban_filter(ip: &str, wallet: Option<&str>) -> Document {
    let mut clauses = vec![Bson::Document(doc! { "type": BanType::Ip.as_str(), "value": ip })];
    if let Some(wallet) = wallet {
        clauses.push(Bson::Document(doc! { "type": BanType::Wallet.as_str(), "value": wallet }));
    }
    doc! { "$or": clauses }
}

#[derive(Debug, Error)]
pub enum FindMatchingBanError {
    #[error("FindMatchingBan: {source}")]
    FindMatchingBan {
        #[from]
        source: mongodb::error::Error,
    },
}

pub async fn find_matching_ban(
    coll: &Collection<Document>,
    ip: &str,
    wallet: Option<&str>,
) -> Result<Option<Document>, FindMatchingBanError> {
    coll.find_one(ban_filter(ip, wallet))
        .await
        .map_err(|source| FindMatchingBanError::FindMatchingBan { source })
}

#[derive(Debug, Error)]
pub enum InsertBanError {
    #[error("SerializeBan: {source}")]
    SerializeBan {
        #[from]
        source: mongodb::bson::ser::Error,
    },

    #[error("InsertBan: {source}")]
    InsertBan {
        #[source]
        source: mongodb::error::Error,
    },
}

/// Inserts the ban and returns it with its generated `_id`.
pub async fn insert_ban(coll: &Collection<Document>, mut ban: Ban) -> Result<Ban, InsertBanError> {
    let document = to_document(&ban)?;
    let result = coll
        .insert_one(document)
        .await
        .map_err(|source| InsertBanError::InsertBan { source })?;

    ban.id = result.inserted_id.as_object_id();
    Ok(ban)
}

#[derive(Debug, Error)]
pub enum DeleteBanError {
    #[error("DeleteBan: {source}")]
    DeleteBan {
        #[from]
        source: mongodb::error::Error,
    },
}

pub async fn delete_ban(coll: &Collection<Document>, id: ObjectId) -> Result<u64, DeleteBanError> {
    let result = coll
        .delete_one(doc! { "_id": id })
        .await
        .map_err(|source| DeleteBanError::DeleteBan { source })?;
    Ok(result.deleted_count)
}

#[derive(Debug, Error)]
pub enum ListBansError {
    #[error("ListBans: {source}")]
    ListBans {
        #[from]
        source: mongodb::error::Error,
    },
}

pub async fn list_bans(coll: &Collection<Document>) -> Result<Vec<Document>, ListBansError> {
    let cursor = coll
        .find(doc! {})
        .sort(doc! { "bannedAt": -1 })
        .await
        .map_err(|source| ListBansError::ListBans { source })?;

    cursor
        .try_collect()
        .await
        .map_err(|source| ListBansError::ListBans { source })
}
