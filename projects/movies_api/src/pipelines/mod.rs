//! Aggregation pipelines executed by MongoDB. Builders here are pure; the
//! queries in `db` run them.

pub mod catalog;
pub mod countries;
pub mod details;
pub mod genres;
pub mod indexes;
pub mod lead_cast;
pub mod names;

use chrono::Utc;

/// `YYYY-MM-DD`, comparable against TMDB's `release_date` strings.
pub fn today_iso_date() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}
