use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("name pattern compiles"));

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid database or collection name")]
pub struct InvalidNameError;

/// Database and collection names taken from the URL must be plain identifiers.
pub fn validate_names(database: &str, collection: &str) -> Result<(), InvalidNameError> {
    if NAME_PATTERN.is_match(database) && NAME_PATTERN.is_match(collection) {
        Ok(())
    } else {
        Err(InvalidNameError)
    }
}
