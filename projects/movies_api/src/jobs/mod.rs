//! One-off loaders and maintenance tasks run by the `movies_jobs` binary.

pub mod copy_view;
pub mod countries;
pub mod details;
pub mod discover;
pub mod indexes;
pub mod names;
pub mod views;

use interfaces_tmdb_movies::models::{filter_excluded_providers, MovieBundle, DEFAULT_EXCLUDED_PROVIDERS};
use mongodb::bson::Document;
use serde_json::json;

use crate::db::json::{json_to_document, JsonToDocumentError};
use crate::pipelines::catalog::DEFAULT_LOCALE;

/// `fullDetails`, `credits`, `providers` and `keywords` as stored on a movie.
/// Excluded providers are dropped from the default locale first.
pub fn bundle_fields(bundle: MovieBundle) -> Result<Document, JsonToDocumentError> {
    let MovieBundle {
        details,
        credits,
        mut providers,
        keywords,
    } = bundle;

    let removed = filter_excluded_providers(&mut providers, DEFAULT_LOCALE, DEFAULT_EXCLUDED_PROVIDERS);
    if removed > 0 {
        tracing::debug!(removed, "excluded providers dropped");
    }

    json_to_document(json!({
        "fullDetails": details,
        "credits": credits,
        "providers": providers,
        "keywords": keywords,
    }))
}
