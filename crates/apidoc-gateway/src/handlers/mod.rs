//! Request handlers.

pub mod apps;
pub mod docs;
pub mod health;
pub mod login;
pub mod users;

use std::future::Future;
use std::time::Duration;

use apidoc_store::{StoreError, StoreResult};
use axum::body::Bytes;
use serde_json::{Map, Value};

use crate::response::{ApiError, ValidationIssue};

/// Parse a request body that must be a JSON object. An empty body is an
/// empty object, so missing fields surface as validation errors.
pub(crate) fn json_object(body: &Bytes) -> Result<Map<String, Value>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) | Err(_) => Err(ApiError::bad_request(
            "request_body_malformed",
            "Request body must be a JSON object",
        )),
    }
}

/// A non-empty string field. Records an issue and returns `None` otherwise.
pub(crate) fn required_string(
    body: &Map<String, Value>,
    field: &str,
    issues: &mut Vec<ValidationIssue>,
) -> Option<String> {
    match body.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        None | Some(Value::Null | Value::String(_)) => {
            issues.push(ValidationIssue::required(field));
            None
        },
        Some(_) => {
            issues.push(ValidationIssue::wrong_type(field, "string"));
            None
        },
    }
}

/// An optional string field. Empty strings count as absent.
pub(crate) fn optional_string(
    body: &Map<String, Value>,
    field: &str,
    issues: &mut Vec<ValidationIssue>,
) -> Option<String> {
    match body.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        None | Some(Value::Null | Value::String(_)) => None,
        Some(_) => {
            issues.push(ValidationIssue::wrong_type(field, "string"));
            None
        },
    }
}

/// Run a store call, failing with [`StoreError::Timeout`] after `timeout`.
pub(crate) async fn bounded<T, F>(timeout: Duration, call: F) -> StoreResult<T>
where
    F: Future<Output = StoreResult<T>>,
{
    tokio::time::timeout(timeout, call)
        .await
        .unwrap_or(Err(StoreError::Timeout))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_json_object() {
        assert!(json_object(&Bytes::from_static(b"")).unwrap().is_empty());
        assert!(json_object(&Bytes::from_static(b"  \n")).unwrap().is_empty());
        assert_eq!(
            json_object(&Bytes::from_static(br#"{"a":1}"#)).unwrap()["a"],
            json!(1)
        );
        for bad in [&b"[1,2]"[..], b"\"str\"", b"{not json", b"null"] {
            let err = json_object(&Bytes::copy_from_slice(bad)).unwrap_err();
            assert_eq!(err.status().as_u16(), 400);
        }
    }

    #[test]
    fn test_string_fields() {
        let body = json!({"a": "x", "b": "", "c": 5, "d": null});
        let body = body.as_object().unwrap();
        let mut issues = Vec::new();

        assert_eq!(required_string(body, "a", &mut issues).as_deref(), Some("x"));
        assert!(required_string(body, "b", &mut issues).is_none());
        assert!(required_string(body, "c", &mut issues).is_none());
        assert!(required_string(body, "d", &mut issues).is_none());
        assert!(required_string(body, "e", &mut issues).is_none());
        let keywords: Vec<_> = issues.iter().map(|i| i.keyword).collect();
        assert_eq!(keywords, ["required", "type", "required", "required"]);

        issues.clear();
        assert!(optional_string(body, "b", &mut issues).is_none());
        assert!(optional_string(body, "e", &mut issues).is_none());
        assert!(issues.is_empty());
        assert!(optional_string(body, "c", &mut issues).is_none());
        assert_eq!(issues.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_times_out() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, StoreError>(1)
        };
        assert!(matches!(
            bounded(Duration::from_secs(1), slow).await,
            Err(StoreError::Timeout)
        ));
        assert_eq!(bounded(Duration::from_secs(1), async { Ok(2) }).await.unwrap(), 2);
    }
}
