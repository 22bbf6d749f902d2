use mongodb::bson::DateTime;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestLog {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub request_id: String,
    pub method: String,
    pub url: String,
    pub ip: String,
    pub timestamp: DateTime,
    pub has_authorization: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseLog {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub request_id: String,
    pub status: u16,
    pub timestamp: DateTime,
    pub duration_ms: i64,
}
