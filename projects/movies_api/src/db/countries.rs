use mongodb::bson::{doc, Document};
use mongodb::Collection;
use thiserror::Error;

use crate::db::documents::queries::{replace_collection, ReplaceCollectionError};
use crate::db::timestamps::{now_utc_string, with_created_timestamps};

/// TMDB origin-country codes and display names, including historical codes
/// TMDB still returns.
pub const COUNTRY_CODES: &[(&str, &str)] = &[
    ("AL", "Albania"),
    ("RO", "Romania"),
    ("SU", "Soviet Union (historical)"),
    ("XG", "East Germany (historical)"),
    ("JO", "Jordan"),
    ("NL", "Netherlands"),
    ("MQ", "Martinique"),
    ("AU", "Australia"),
    ("MX", "Mexico"),
    ("CH", "Switzerland"),
    ("NP", "Nepal"),
    ("BO", "Bolivia"),
    ("IR", "Iran"),
    ("GR", "Greece"),
    ("PA", "Panama"),
    ("KN", "Saint Kitts and Nevis"),
    ("KW", "Kuwait"),
    ("BR", "Brazil"),
    ("PL", "Poland"),
    ("RS", "Serbia"),
    ("UA", "Ukraine"),
    ("LK", "Sri Lanka"),
    ("GP", "Guadeloupe"),
    ("ME", "Montenegro"),
    ("LB", "Lebanon"),
    ("LI", "Liechtenstein"),
    ("CF", "Central African Republic"),
    ("PR", "Puerto Rico"),
    ("EC", "Ecuador"),
    ("DK", "Denmark"),
    ("PK", "Pakistan"),
    ("SA", "Saudi Arabia"),
    ("CO", "Colombia"),
    ("BG", "Bulgaria"),
    ("US", "United States"),
    ("IT", "Italy"),
    ("TR", "Turkey"),
    ("NZ", "New Zealand"),
    ("LT", "Lithuania"),
    ("RU", "Russia"),
    ("ZA", "South Africa"),
    ("MT", "Malta"),
    ("CY", "Cyprus"),
    ("ID", "Indonesia"),
    ("LV", "Latvia"),
    ("DE", "Germany"),
    ("CZ", "Czech Republic"),
    ("BM", "Bermuda"),
    ("SI", "Slovenia"),
    ("IN", "India"),
    ("SE", "Sweden"),
    ("RE", "Réunion"),
    ("UY", "Uruguay"),
    ("GB", "United Kingdom"),
    ("SG", "Singapore"),
    ("HN", "Honduras"),
    ("QA", "Qatar"),
    ("HR", "Croatia"),
    ("AR", "Argentina"),
    ("PY", "Paraguay"),
    ("LU", "Luxembourg"),
    ("AW", "Aruba"),
    ("NG", "Nigeria"),
    ("NE", "Niger"),
    ("HK", "Hong Kong"),
    ("FI", "Finland"),
    ("FR", "France"),
    ("NO", "Norway"),
    ("ES", "Spain"),
    ("PH", "Philippines"),
    ("DO", "Dominican Republic"),
    ("HU", "Hungary"),
    ("XC", "Czechoslovakia (historical)"),
    ("CL", "Chile"),
    ("JP", "Japan"),
    ("BW", "Botswana"),
    ("MY", "Malaysia"),
    ("CN", "China"),
    ("AT", "Austria"),
    ("BA", "Bosnia and Herzegovina"),
    ("KZ", "Kazakhstan"),
    ("PS", "Palestine"),
    ("MA", "Morocco"),
    ("TH", "Thailand"),
    ("IE", "Ireland"),
    ("YU", "Yugoslavia (historical)"),
    ("EG", "Egypt"),
    ("TW", "Taiwan"),
    ("EE", "Estonia"),
    ("VE", "Venezuela"),
    ("IS", "Iceland"),
    ("HT", "Haiti"),
    ("CA", "Canada"),
    ("DZ", "Algeria"),
    ("BE", "Belgium"),
    ("CD", "Democratic Republic of the Congo"),
    ("MR", "Mauritania"),
    ("MN", "Mongolia"),
    ("PE", "Peru"),
    ("TN", "Tunisia"),
    ("VN", "Vietnam"),
    ("SK", "Slovakia"),
    ("CI", "Côte d'Ivoire"),
    ("IL", "Israel"),
    ("AE", "United Arab Emirates"),
    ("BY", "Belarus"),
    ("ET", "Ethiopia"),
    ("KR", "South Korea"),
    ("LY", "Libya"),
    ("GH", "Ghana"),
    ("PT", "Portugal"),
];

pub fn country_documents(now: &str) -> Vec<Document> {
    COUNTRY_CODES
        .iter()
        .map(|(code, name)| with_created_timestamps(doc! { "code": *code, "name": *name }, now))
        .collect()
}

#[derive(Debug, Error)]
pub enum ReplaceCountriesError {
    #[error("ReplaceCountries: {source}")]
    Replace {
        #[from]
        source: ReplaceCollectionError,
    },
}

pub async fn replace_countries(coll: &Collection<Document>) -> Result<usize, ReplaceCountriesError> {
    Ok(replace_collection(coll, country_documents(&now_utc_string())).await?)
}
