//! Conversions between request/response JSON and BSON documents.

use mongodb::bson::{Bson, Document};
use serde_json::Value;
use thiserror::Error;

/// ObjectIds become hex strings and dates become RFC 3339 strings; everything
/// else uses relaxed Extended JSON.
pub fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(date) => date
            .try_to_rfc3339_string()
            .map(Value::String)
            .unwrap_or_else(|_| Value::from(date.timestamp_millis())),
        Bson::Document(document) => document_to_json(document),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        other => other.into_relaxed_extjson(),
    }
}

pub fn document_to_json(document: Document) -> Value {
    Value::Object(
        document
            .into_iter()
            .map(|(key, value)| (key, bson_to_json(value)))
            .collect(),
    )
}

pub fn documents_to_json(documents: Vec<Document>) -> Value {
    Value::Array(documents.into_iter().map(document_to_json).collect())
}

#[derive(Debug, Error)]
pub enum JsonToDocumentError {
    #[error("expected a JSON object")]
    NotAnObject,

    #[error("InvalidExtendedJson: {source}")]
    InvalidExtendedJson {
        #[from]
        source: mongodb::bson::extjson::de::Error,
    },
}

/// Accepts a JSON object, including Extended JSON values such as `{"$oid": ...}`.
pub fn json_to_document(value: Value) -> Result<Document, JsonToDocumentError> {
    if !value.is_object() {
        return Err(JsonToDocumentError::NotAnObject);
    }

    match Bson::try_from(value)? {
        Bson::Document(document) => Ok(document),
        _ => Err(JsonToDocumentError::NotAnObject),
    }
}

/// Parses a JSON query-string parameter such as `filter` or `sort`.
pub fn parse_json_document(raw: &str) -> Result<Document, ParseJsonDocumentError> {
    let value: Value = serde_json::from_str(raw)?;
    Ok(json_to_document(value)?)
}

#[derive(Debug, Error)]
pub enum ParseJsonDocumentError {
    #[error("Syntax: {source}")]
    Syntax {
        #[from]
        source: serde_json::Error,
    },

    #[error("Document: {source}")]
    Document {
        #[from]
        source: JsonToDocumentError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{doc, oid::ObjectId, DateTime};
    use serde_json::json;

    #[test]
    fn object_ids_and_dates_render_as_strings() {
        let oid = ObjectId::parse_str("65a1f0c2e4b0a1b2c3d4e5f6").unwrap();
        let when = DateTime::from_millis(0);
        let json = document_to_json(doc! {
            "_id": oid,
            "bannedAt": when,
            "nested": { "ids": [oid] },
            "id": 11_i64,
            "title": "Alien",
        });

        assert_eq!(json["_id"], "65a1f0c2e4b0a1b2c3d4e5f6");
        assert_eq!(json["bannedAt"], "1970-01-01T00:00:00Z");
        assert_eq!(json["nested"]["ids"][0], "65a1f0c2e4b0a1b2c3d4e5f6");
        assert_eq!(json["id"], 11);
        assert_eq!(json["title"], "Alien");
    }

    #[test]
    fn objects_convert_to_documents() {
        let document = json_to_document(json!({
            "title": "Heat",
            "vote_average": 8.3,
            "_id": { "$oid": "65a1f0c2e4b0a1b2c3d4e5f6" },
        }))
        .unwrap();

        assert_eq!(document.get_str("title").unwrap(), "Heat");
        assert!(document.get_object_id("_id").is_ok());
    }

    #[test]
    fn non_objects_are_rejected() {
        assert!(matches!(json_to_document(json!([1, 2])), Err(JsonToDocumentError::NotAnObject)));
        assert!(matches!(
            json_to_document(json!({ "$oid": "65a1f0c2e4b0a1b2c3d4e5f6" })),
            Err(JsonToDocumentError::NotAnObject)
        ));
    }

    #[test]
    fn query_parameters_parse_operators() {
        let filter = parse_json_document(r#"{"vote_average":{"$gt":7}}"#).unwrap();
        let range = filter.get_document("vote_average").unwrap();
        assert!(range.contains_key("$gt"));
        assert!(matches!(
            parse_json_document("{not json"),
            Err(ParseJsonDocumentError::Syntax { .. })
        ));
    }
}
