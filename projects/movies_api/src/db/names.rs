use mongodb::bson::Document;
use mongodb::Collection;
use thiserror::Error;

use crate::db::documents::queries::{
    aggregate_documents, replace_collection, AggregateDocumentsError, AggregateLimits,
    ReplaceCollectionError,
};
use crate::pipelines::names::names_by_country;

#[derive(Debug, Error)]
pub enum ReplaceNamesError {
    #[error("AggregateNames: {source}")]
    Aggregate {
        #[from]
        source: AggregateDocumentsError,
    },

    #[error("StoreNames: {source}")]
    Store {
        #[from]
        source: ReplaceCollectionError,
    },
}

/// Rebuilds `names` from the cast of every stored movie. Returns the number of
/// country and first-name groups written.
pub async fn replace_names(
    movies: &Collection<Document>,
    names: &Collection<Document>,
) -> Result<usize, ReplaceNamesError> {
    let limits = AggregateLimits {
        max_time: None,
        allow_disk_use: true,
    };
    let groups = aggregate_documents(movies, names_by_country(), limits).await?;
    tracing::info!(groups = groups.len(), "aggregated names by country");

    Ok(replace_collection(names, groups).await?)
}
