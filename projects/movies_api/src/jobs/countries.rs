use tracing::info;

use crate::db::countries::{replace_countries, ReplaceCountriesError};
use crate::db::{Db, COUNTRIES};

/// Rewrites `countries` from the static ISO code list.
pub async fn run(db: &Db) -> Result<usize, ReplaceCountriesError> {
    let written = replace_countries(&db.catalog(COUNTRIES)).await?;
    info!(written, "countries replaced");
    Ok(written)
}
