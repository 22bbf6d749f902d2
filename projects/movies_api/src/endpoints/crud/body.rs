use axum::body::Bytes;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseObjectBodyError {
    #[error("body is empty")]
    Empty,

    #[error("Invalid JSON body")]
    InvalidJson,

    #[error("Request body must be a JSON object")]
    NotAnObject,
}

/// A non-empty JSON object. Blank bodies and `{}` are both `Empty`.
pub fn parse_object_body(body: &Bytes) -> Result<Map<String, Value>, ParseObjectBodyError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ParseObjectBodyError::Empty);
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(object)) if object.is_empty() => Err(ParseObjectBodyError::Empty),
        Ok(Value::Object(object)) => Ok(object),
        Ok(Value::Null) => Err(ParseObjectBodyError::Empty),
        Ok(_) => Err(ParseObjectBodyError::NotAnObject),
        Err(_) => Err(ParseObjectBodyError::InvalidJson),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_shapes_are_rejected() {
        for raw in ["", "  ", "{}", "null"] {
            assert_eq!(
                parse_object_body(&Bytes::from(raw)),
                Err(ParseObjectBodyError::Empty),
                "{raw:?}"
            );
        }
    }

    #[test]
    fn non_objects_and_bad_json() {
        assert_eq!(parse_object_body(&Bytes::from("[1]")), Err(ParseObjectBodyError::NotAnObject));
        assert_eq!(parse_object_body(&Bytes::from("{\"a\":")), Err(ParseObjectBodyError::InvalidJson));
    }

    #[test]
    fn objects_pass_through() {
        let object = parse_object_body(&Bytes::from(r#"{"title":"Heat"}"#)).unwrap();
        assert_eq!(object["title"], "Heat");
    }
}
