use mongodb::bson::{to_document, Document};
use mongodb::Collection;
use serde::Serialize;
use thiserror::Error;

use crate::db::logs::models::{RequestLog, ResponseLog};

#[derive(Debug, Error)]
pub enum InsertLogError {
    #[error("SerializeLog: {source}")]
    SerializeLog {
        #[from]
        source: mongodb::bson::ser::Error,
    },

    #[error("InsertLog: {source}")]
    InsertLog {
        #[from]
        source: mongodb::error::Error,
    },
}

pub async fn insert_request_log(coll: &Collection<Document>, log: &RequestLog) -> Result<(), InsertLogError> {
    insert_log(coll, log).await
}

pub async fn insert_response_log(coll: &Collection<Document>, log: &ResponseLog) -> Result<(), InsertLogError> {
    insert_log(coll, log).await
}

async fn insert_log<T: Serialize>(coll: &Collection<Document>, log: &T) -> Result<(), InsertLogError> {
    let document = to_document(log)?;
    coll.insert_one(document).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::DateTime;

    #[test]
    fn request_logs_use_camel_case_fields() {
        let log = RequestLog {
            kind: "request",
            request_id: "5f0c".into(),
            method: "GET".into(),
            url: "/api/movies/movies?limit=5".into(),
            ip: "127.0.0.1".into(),
            timestamp: DateTime::from_millis(0),
            has_authorization: true,
        };
        let document = to_document(&log).unwrap();

        assert_eq!(document.get_str("type").unwrap(), "request");
        assert_eq!(document.get_str("requestId").unwrap(), "5f0c");
        assert!(document.get_bool("hasAuthorization").unwrap());
    }

    #[test]
    fn response_logs_carry_status_and_duration() {
        let log = ResponseLog {
            kind: "response",
            request_id: "5f0c".into(),
            status: 404,
            timestamp: DateTime::from_millis(0),
            duration_ms: 12,
        };
        let document = to_document(&log).unwrap();

        assert_eq!(document.get_i32("status").unwrap(), 404);
        assert_eq!(document.get_i64("durationMs").unwrap(), 12);
    }
}
