use std::fmt;

use mongodb::bson::{doc, oid::ObjectId, Document};

/// How a path id addresses a document: 24 hex chars hit `_id`, integers and
/// anything else hit the application-level `id` field.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentKey {
    ObjectId(ObjectId),
    Numeric(i64),
    Text(String),
}

impl DocumentKey {
    pub fn parse(raw: &str) -> Self {
        if raw.len() == 24 && raw.chars().all(|c| c.is_ascii_hexdigit()) {
            if let Ok(oid) = ObjectId::parse_str(raw) {
                return DocumentKey::ObjectId(oid);
            }
        }

        match raw.parse::<i64>() {
            Ok(number) => DocumentKey::Numeric(number),
            Err(_) => DocumentKey::Text(raw.to_string()),
        }
    }

    pub fn filter(&self) -> Document {
        match self {
            DocumentKey::ObjectId(oid) => doc! { "_id": *oid },
            DocumentKey::Numeric(number) => doc! { "id": *number },
            DocumentKey::Text(text) => doc! { "id": text.as_str() },
        }
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKey::ObjectId(oid) => write!(f, "{oid}"),
            DocumentKey::Numeric(number) => write!(f, "{number}"),
            DocumentKey::Text(text) => f.write_str(text),
        }
    }
}
