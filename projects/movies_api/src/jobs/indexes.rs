use tracing::{info, warn};

use crate::db::indexes::create_ascending_index;
use crate::db::{Db, MOVIES};
use crate::pipelines::catalog::catalog_view;
use crate::pipelines::indexes::recommend_indexes;
use crate::pipelines::today_iso_date;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexesSummary {
    pub recommended: usize,
    pub created: usize,
    pub failed: usize,
}

/// Creates the indexes the catalog pipeline benefits from. A failing index is
/// logged and does not stop the rest.
pub async fn run(db: &Db) -> IndexesSummary {
    let pipeline = catalog_view(&today_iso_date(), &[]);
    let recommendations = recommend_indexes(MOVIES, &pipeline);
    let mut summary = IndexesSummary {
        recommended: recommendations.len(),
        ..IndexesSummary::default()
    };

    for recommendation in &recommendations {
        info!(
            collection = %recommendation.collection,
            field = %recommendation.field,
            reason = %recommendation.reason,
            "recommended index"
        );
    }

    for recommendation in &recommendations {
        let name = recommendation.index_name();
        let coll = db.catalog(&recommendation.collection);
        match create_ascending_index(&coll, &recommendation.field, &name).await {
            Ok(created) => {
                info!(collection = %recommendation.collection, index = %created, "index ready");
                summary.created += 1;
            }
            Err(err) => {
                warn!(collection = %recommendation.collection, error = %err, "index creation failed");
                summary.failed += 1;
            }
        }
    }

    info!(created = summary.created, failed = summary.failed, "indexes finished");
    summary
}
