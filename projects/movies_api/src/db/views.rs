use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::Database;
use thiserror::Error;

use crate::db::documents::queries::{replace_collection, ReplaceCollectionError};

#[derive(Debug, Error)]
pub enum RecreateViewError {
    #[error("CreateView {name}: {source}")]
    CreateView {
        name: String,
        #[source]
        source: mongodb::error::Error,
    },
}

/// Drops `name` if present, then defines it as a view over `source`.
pub async fn recreate_view(
    db: &Database,
    name: &str,
    source: &str,
    pipeline: Vec<Document>,
) -> Result<(), RecreateViewError> {
    if let Err(err) = db.collection::<Document>(name).drop().await {
        tracing::debug!(view = name, error = %err, "no existing view dropped");
    }

    db.create_collection(name)
        .view_on(source.to_string())
        .pipeline(pipeline)
        .await
        .map_err(|source| RecreateViewError::CreateView {
            name: name.to_string(),
            source,
        })?;

    tracing::info!(view = name, source, "view created");
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyViewSummary {
    pub copied: usize,
    pub with_providers: usize,
}

#[derive(Debug, Error)]
pub enum CopyViewError {
    #[error("ReadView {view}: {source}")]
    ReadView {
        view: String,
        #[source]
        source: mongodb::error::Error,
    },

    #[error("WriteTarget: {source}")]
    WriteTarget {
        #[from]
        source: ReplaceCollectionError,
    },
}

/// True when the document carries a non-empty `providers` value.
pub fn has_providers(document: &Document) -> bool {
    match document.get("providers") {
        None | Some(Bson::Null) => false,
        Some(Bson::Document(providers)) => !providers.is_empty(),
        Some(Bson::Array(providers)) => !providers.is_empty(),
        Some(_) => true,
    }
}

/// Materialises a view into `target`, replacing whatever it held.
pub async fn copy_view_into(db: &Database, view: &str, target: &str) -> Result<CopyViewSummary, CopyViewError> {
    let read_error = |source| CopyViewError::ReadView {
        view: view.to_string(),
        source,
    };
    let documents: Vec<Document> = db
        .collection::<Document>(view)
        .find(doc! {})
        .await
        .map_err(read_error)?
        .try_collect()
        .await
        .map_err(read_error)?;

    let with_providers = documents.iter().filter(|document| has_providers(document)).count();
    let copied = replace_collection(&db.collection(target), documents).await?;

    Ok(CopyViewSummary { copied, with_providers })
}
