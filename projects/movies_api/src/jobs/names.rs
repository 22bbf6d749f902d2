use tracing::info;

use crate::db::names::{replace_names, ReplaceNamesError};
use crate::db::{Db, MOVIES, NAMES};

pub async fn run(db: &Db) -> Result<usize, ReplaceNamesError> {
    let written = replace_names(&db.catalog(MOVIES), &db.catalog(NAMES)).await?;
    info!(written, "names replaced");
    Ok(written)
}
