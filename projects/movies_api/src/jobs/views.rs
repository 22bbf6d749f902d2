use mongodb::bson::Bson;
use regex::Regex;
use thiserror::Error;
use tracing::info;

use crate::db::documents::queries::{aggregate_documents, AggregateDocumentsError, AggregateLimits};
use crate::db::views::{recreate_view, RecreateViewError};
use crate::db::{Db, CATALOG_VIEW, GENRES_VIEW, MOVIES};
use crate::pipelines::catalog::{catalog_view, keyword_ids_matching};
use crate::pipelines::genres::genres_view;
use crate::pipelines::today_iso_date;

#[derive(Debug, Error)]
pub enum ViewsError {
    #[error("InvalidKeywordPattern {pattern}: {source}")]
    InvalidKeywordPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("ResolveKeywords: {source}")]
    ResolveKeywords {
        #[from]
        source: AggregateDocumentsError,
    },

    #[error("RecreateView: {source}")]
    RecreateView {
        #[from]
        source: RecreateViewError,
    },
}

/// Recreates the catalog and genres views over `movies`. Movies tagged with a
/// keyword matching `exclude_keywords` are left out of the catalog.
pub async fn run(db: &Db, exclude_keywords: Option<&str>) -> Result<(), ViewsError> {
    let excluded = match exclude_keywords {
        Some(pattern) => excluded_keyword_ids(db, pattern).await?,
        None => Vec::new(),
    };

    let catalog_db = db.catalog_db();
    let today = today_iso_date();
    recreate_view(&catalog_db, CATALOG_VIEW, MOVIES, catalog_view(&today, &excluded)).await?;
    recreate_view(&catalog_db, GENRES_VIEW, MOVIES, genres_view()).await?;

    info!(%today, excluded_keywords = excluded.len(), "views recreated");
    Ok(())
}

async fn excluded_keyword_ids(db: &Db, pattern: &str) -> Result<Vec<Bson>, ViewsError> {
    Regex::new(pattern).map_err(|source| ViewsError::InvalidKeywordPattern {
        pattern: pattern.to_string(),
        source,
    })?;

    let groups = aggregate_documents(
        &db.catalog(MOVIES),
        keyword_ids_matching(pattern),
        AggregateLimits {
            max_time: None,
            allow_disk_use: true,
        },
    )
    .await?;

    let ids: Vec<Bson> = groups
        .into_iter()
        .filter_map(|mut group| group.remove("_id"))
        .filter(|id| !matches!(id, Bson::Null))
        .collect();
    info!(pattern, matched = ids.len(), "resolved excluded keywords");
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn invalid_pattern_is_rejected_before_querying() {
        let db = Db::connect("mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=200", "movies")
            .await
            .unwrap();

        let err = run(&db, Some("(unclosed")).await.unwrap_err();

        assert!(matches!(err, ViewsError::InvalidKeywordPattern { .. }));
    }
}
