use chrono::{SecondsFormat, Utc};
use mongodb::bson::{doc, Document};

pub const CREATED_UTC: &str = "created_utc";
pub const UPDATED_UTC: &str = "updated_utc";

/// ISO-8601 UTC with millisecond precision, e.g. `2024-05-01T12:00:00.000Z`.
pub fn now_utc_string() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// For documents about to be inserted: keeps an existing `created_utc`.
pub fn with_created_timestamps(mut data: Document, now: &str) -> Document {
    if !data.contains_key(CREATED_UTC) {
        data.insert(CREATED_UTC, now);
    }
    data.insert(UPDATED_UTC, now);
    data
}

pub fn update_with_timestamps(mut data: Document, now: &str) -> Document {
    data.insert(UPDATED_UTC, now);
    doc! { "$set": data }
}

/// `created_utc` is only written when the upsert inserts.
pub fn upsert_with_timestamps(mut data: Document, now: &str) -> Document {
    data.remove(CREATED_UTC);
    data.insert(UPDATED_UTC, now);
    let mut on_insert = Document::new();
    on_insert.insert(CREATED_UTC, now);
    doc! {
        "$set": data,
        "$setOnInsert": on_insert,
    }
}
