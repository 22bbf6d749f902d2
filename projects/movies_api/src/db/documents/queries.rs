use std::time::Duration;

use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::results::UpdateResult;
use mongodb::Collection;
use thiserror::Error;

pub const DEFAULT_FIND_LIMIT: i64 = 50;

/// Options accepted by the generic collection read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindQuery {
    pub filter: Document,
    pub projection: Option<Document>,
    pub sort: Option<Document>,
    pub skip: u64,
    pub limit: i64,
}

#[derive(Debug, Error)]
pub enum InsertDocumentError {
    #[error("InsertDocument: {source}")]
    InsertDocument {
        #[from]
        source: mongodb::error::Error,
    },
}

pub async fn insert_document(
    coll: &Collection<Document>,
    document: &Document,
) -> Result<Bson, InsertDocumentError> {
    let result = coll
        .insert_one(document)
        .await
        .map_err(|source| InsertDocumentError::InsertDocument { source })?;
    Ok(result.inserted_id)
}

#[derive(Debug, Error)]
pub enum FindDocumentsError {
    #[error("FindDocuments: {source}")]
    FindDocuments {
        #[source]
        source: mongodb::error::Error,
    },

    #[error("CollectDocuments: {source}")]
    CollectDocuments {
        #[source]
        source: mongodb::error::Error,
    },
}

pub async fn find_documents(
    coll: &Collection<Document>,
    query: FindQuery,
) -> Result<Vec<Document>, FindDocumentsError> {
    let mut action = coll.find(query.filter).skip(query.skip).limit(query.limit);
    if let Some(projection) = query.projection {
        action = action.projection(projection);
    }
    if let Some(sort) = query.sort {
        action = action.sort(sort);
    }

    let cursor = action
        .await
        .map_err(|source| FindDocumentsError::FindDocuments { source })?;

    cursor
        .try_collect()
        .await
        .map_err(|source| FindDocumentsError::CollectDocuments { source })
}

#[derive(Debug, Error)]
pub enum UpdateDocumentError {
    #[error("UpdateDocument: {source}")]
    UpdateDocument {
        #[from]
        source: mongodb::error::Error,
    },
}

/// `$set`s the given fields on the first document matching `filter`.
pub async fn update_document(
    coll: &Collection<Document>,
    filter: Document,
    fields: Document,
) -> Result<UpdateResult, UpdateDocumentError> {
    coll.update_one(filter, doc! { "$set": fields })
        .await
        .map_err(|source| UpdateDocumentError::UpdateDocument { source })
}

#[derive(Debug, Error)]
pub enum UpsertDocumentError {
    #[error("Document has no id field")]
    MissingId,

    #[error("UpsertDocument: {source}")]
    UpsertDocument {
        #[from]
        source: mongodb::error::Error,
    },
}

/// Upserts on the application-level `id` field, which must be present in `fields`.
pub async fn upsert_by_id_field(
    coll: &Collection<Document>,
    fields: Document,
) -> Result<UpdateResult, UpsertDocumentError> {
    let id = match fields.get("id") {
        None | Some(Bson::Null) => return Err(UpsertDocumentError::MissingId),
        Some(Bson::String(text)) if text.trim().is_empty() => return Err(UpsertDocumentError::MissingId),
        Some(id) => id.clone(),
    };

    upsert_with_update(coll, doc! { "id": id }, doc! { "$set": fields }).await
}

pub async fn upsert_with_update(
    coll: &Collection<Document>,
    filter: Document,
    update: Document,
) -> Result<UpdateResult, UpsertDocumentError> {
    coll.update_one(filter, update)
        .upsert(true)
        .await
        .map_err(|source| UpsertDocumentError::UpsertDocument { source })
}

#[derive(Debug, Error)]
pub enum DeleteDocumentError {
    #[error("DeleteDocument: {source}")]
    DeleteDocument {
        #[from]
        source: mongodb::error::Error,
    },
}

pub async fn delete_document(
    coll: &Collection<Document>,
    filter: Document,
) -> Result<u64, DeleteDocumentError> {
    let result = coll
        .delete_one(filter)
        .await
        .map_err(|source| DeleteDocumentError::DeleteDocument { source })?;
    Ok(result.deleted_count)
}

#[derive(Debug, Error)]
pub enum AggregateDocumentsError {
    #[error("Aggregate: {source}")]
    Aggregate {
        #[source]
        source: mongodb::error::Error,
    },

    #[error("CollectAggregate: {source}")]
    CollectAggregate {
        #[source]
        source: mongodb::error::Error,
    },
}

/// Limits applied to long-running aggregations.
#[derive(Debug, Clone, Copy, Default)]
pub struct AggregateLimits {
    pub max_time: Option<Duration>,
    pub allow_disk_use: bool,
}

pub async fn aggregate_documents(
    coll: &Collection<Document>,
    pipeline: Vec<Document>,
    limits: AggregateLimits,
) -> Result<Vec<Document>, AggregateDocumentsError> {
    let mut action = coll.aggregate(pipeline);
    if let Some(max_time) = limits.max_time {
        action = action.max_time(max_time);
    }
    if limits.allow_disk_use {
        action = action.allow_disk_use(true);
    }

    let cursor = action
        .await
        .map_err(|source| AggregateDocumentsError::Aggregate { source })?;

    cursor
        .try_collect()
        .await
        .map_err(|source| AggregateDocumentsError::CollectAggregate { source })
}

#[derive(Debug, Error)]
pub enum ReplaceCollectionError {
    #[error("ClearCollection: {source}")]
    ClearCollection {
        #[source]
        source: mongodb::error::Error,
    },

    #[error("InsertMany: {source}")]
    InsertMany {
        #[source]
        source: mongodb::error::Error,
    },
}

/// Empties the collection, then inserts `documents`. Returns the inserted count.
pub async fn replace_collection(
    coll: &Collection<Document>,
    documents: Vec<Document>,
) -> Result<usize, ReplaceCollectionError> {
    coll.delete_many(doc! {})
        .await
        .map_err(|source| ReplaceCollectionError::ClearCollection { source })?;

    if documents.is_empty() {
        return Ok(0);
    }

    let result = coll
        .insert_many(documents)
        .await
        .map_err(|source| ReplaceCollectionError::InsertMany { source })?;
    Ok(result.inserted_ids.len())
}
