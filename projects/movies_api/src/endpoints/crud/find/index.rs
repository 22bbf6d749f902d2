use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::db::documents::queries::{find_documents, FindDocumentsError, FindQuery, DEFAULT_FIND_LIMIT};
use crate::db::json::{document_to_json, documents_to_json, parse_json_document, ParseJsonDocumentError};
use crate::db::keys::DocumentKey;
use crate::db::Db;
use crate::endpoints::response::json_error;
use crate::middleware::validate::{validate_names, InvalidNameError};

/// Query string of the generic read. JSON parameters arrive as raw strings.
#[derive(Debug, Default, Deserialize)]
pub struct FindParams {
    pub filter: Option<String>,
    pub projection: Option<String>,
    pub sort: Option<String>,
    pub limit: Option<String>,
    pub skip: Option<String>,
}

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    InvalidName {
        #[from]
        source: InvalidNameError,
    },

    #[error("Invalid filter JSON")]
    InvalidFilter { source: ParseJsonDocumentError },

    #[error("Invalid projection JSON")]
    InvalidProjection { source: ParseJsonDocumentError },

    #[error("Invalid sort JSON")]
    InvalidSort { source: ParseJsonDocumentError },

    #[error("Invalid limit")]
    InvalidLimit,

    #[error("Invalid skip")]
    InvalidSkip,

    #[error("FindDocuments: {source}")]
    FindDocuments {
        #[from]
        source: FindDocumentsError,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        match self {
            HandlerError::FindDocuments { source } => {
                tracing::error!(error = %source, "find failed");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
            }
            other => json_error(StatusCode::BAD_REQUEST, other.to_string()),
        }
    }
}

/// Builds the driver query. With a key, the key replaces any `filter` and a
/// single document is read.
pub fn build_query(params: &FindParams, key: Option<&DocumentKey>) -> Result<FindQuery, HandlerError> {
    let filter = match (key, params.filter.as_deref()) {
        (Some(key), _) => key.filter(),
        (None, Some(raw)) => parse_json_document(raw).map_err(|source| HandlerError::InvalidFilter { source })?,
        (None, None) => Default::default(),
    };
    let projection = params
        .projection
        .as_deref()
        .map(parse_json_document)
        .transpose()
        .map_err(|source| HandlerError::InvalidProjection { source })?;
    let sort = params
        .sort
        .as_deref()
        .map(parse_json_document)
        .transpose()
        .map_err(|source| HandlerError::InvalidSort { source })?;

    let limit = match params.limit.as_deref().map(str::trim) {
        None | Some("") => DEFAULT_FIND_LIMIT,
        Some(raw) => raw
            .parse::<i64>()
            .ok()
            .filter(|limit| *limit >= 0)
            .ok_or(HandlerError::InvalidLimit)?,
    };
    let skip = match params.skip.as_deref().map(str::trim) {
        None | Some("") => 0,
        Some(raw) => raw.parse::<u64>().map_err(|_| HandlerError::InvalidSkip)?,
    };

    Ok(FindQuery {
        filter,
        projection,
        sort,
        skip,
        limit: if key.is_some() { 1 } else { limit },
    })
}

/// Axum handler: GET /api/{database}/{collection}
pub async fn find_many(
    Extension(db): Extension<Db>,
    Path((database, collection)): Path<(String, String)>,
    Query(params): Query<FindParams>,
) -> Result<Json<Value>, HandlerError> {
    validate_names(&database, &collection)?;
    let query = build_query(&params, None)?;
    let documents = find_documents(&db.collection(&database, &collection), query).await?;
    Ok(Json(documents_to_json(documents)))
}

/// Axum handler: GET /api/{database}/{collection}/{id}. Responds `null` when absent.
pub async fn find_one(
    Extension(db): Extension<Db>,
    Path((database, collection, id)): Path<(String, String, String)>,
    Query(params): Query<FindParams>,
) -> Result<Json<Value>, HandlerError> {
    validate_names(&database, &collection)?;
    let key = DocumentKey::parse(&id);
    let query = build_query(&params, Some(&key))?;
    let document = find_documents(&db.collection(&database, &collection), query)
        .await?
        .into_iter()
        .next();
    Ok(Json(document.map(document_to_json).unwrap_or(Value::Null)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    fn params(pairs: &[(&str, &str)]) -> FindParams {
        let mut params = FindParams::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match *key {
                "filter" => params.filter = value,
                "projection" => params.projection = value,
                "sort" => params.sort = value,
                "limit" => params.limit = value,
                "skip" => params.skip = value,
                _ => unreachable!(),
            }
        }
        params
    }

    #[test]
    fn defaults_when_nothing_given() {
        let query = build_query(&FindParams::default(), None).unwrap();
        assert_eq!(query.filter, doc! {});
        assert_eq!(query.limit, DEFAULT_FIND_LIMIT);
        assert_eq!(query.skip, 0);
        assert!(query.projection.is_none());
    }

    #[test]
    fn parses_json_parameters() {
        let query = build_query(
            &params(&[
                ("filter", r#"{"year":{"$gt":1999}}"#),
                ("projection", r#"{"title":1}"#),
                ("sort", r#"{"year":-1}"#),
                ("limit", "5"),
                ("skip", "10"),
            ]),
            None,
        )
        .unwrap();

        assert!(query.filter.get_document("year").unwrap().contains_key("$gt"));
        assert!(query.projection.unwrap().contains_key("title"));
        assert!(query.sort.unwrap().contains_key("year"));
        assert_eq!((query.limit, query.skip), (5, 10));
    }

    #[test]
    fn invalid_json_names_the_parameter() {
        let err = build_query(&params(&[("filter", "{nope")]), None).unwrap_err();
        assert_eq!(err.to_string(), "Invalid filter JSON");

        let err = build_query(&params(&[("projection", "[1]")]), None).unwrap_err();
        assert_eq!(err.to_string(), "Invalid projection JSON");

        let err = build_query(&params(&[("sort", "")]), None).unwrap_err();
        assert_eq!(err.to_string(), "Invalid sort JSON");
    }

    #[test]
    fn key_overrides_filter_and_limits_to_one() {
        let key = DocumentKey::parse("11705");
        let query = build_query(&params(&[("filter", r#"{"a":1}"#)]), Some(&key)).unwrap();

        assert_eq!(query.filter, doc! { "id": 11705_i64 });
        assert_eq!(query.limit, 1);
    }

    #[test]
    fn rejects_negative_limit_and_bad_skip() {
        assert!(matches!(
            build_query(&params(&[("limit", "-1")]), None),
            Err(HandlerError::InvalidLimit)
        ));
        assert!(matches!(
            build_query(&params(&[("skip", "x")]), None),
            Err(HandlerError::InvalidSkip)
        ));
    }
}
