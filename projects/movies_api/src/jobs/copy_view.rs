use tracing::info;

use crate::db::views::{copy_view_into, CopyViewError, CopyViewSummary};
use crate::db::Db;

pub async fn run(db: &Db, view: &str, target: &str) -> Result<CopyViewSummary, CopyViewError> {
    let summary = copy_view_into(&db.catalog_db(), view, target).await?;
    info!(
        view,
        target,
        copied = summary.copied,
        with_providers = summary.with_providers,
        "view copied"
    );
    Ok(summary)
}
