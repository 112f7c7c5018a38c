//! Envelope encoding and decoding.
//!
//! Shopify wraps every resource body under a key named for the resource:
//! `{"theme": {...}}` for a single theme, `{"themes": [...]}` for a list.
//! The envelope only exists on the wire; callers deal in plain entities.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Result, ShopifyError};

/// Serialize `entity` and wrap it under `key`.
///
/// Top-level members serialized as `null` are dropped so that unset fields
/// are omitted rather than cleared on a partial update.
///
/// # Errors
///
/// Returns [`ShopifyError::InvalidArgument`] if `key` is empty or the entity
/// does not serialize to a JSON object.
pub fn encode<T: Serialize + ?Sized>(entity: &T, key: &str) -> Result<Value> {
    let object = to_object(entity)?;
    wrap(object, key)
}

/// Wrap an already-serialized object under `key`.
pub(crate) fn wrap(object: Map<String, Value>, key: &str) -> Result<Value> {
    if key.is_empty() {
        return Err(ShopifyError::InvalidArgument(
            "envelope key must not be empty".to_string(),
        ));
    }

    let mut envelope = Map::with_capacity(1);
    envelope.insert(key.to_string(), Value::Object(object));
    Ok(Value::Object(envelope))
}

/// Serialize an entity into a JSON object with `null` members removed.
pub(crate) fn to_object<T: Serialize + ?Sized>(entity: &T) -> Result<Map<String, Value>> {
    let value = serde_json::to_value(entity).map_err(|e| {
        ShopifyError::InvalidArgument(format!("request body could not be serialized: {e}"))
    })?;

    match value {
        Value::Object(mut object) => {
            object.retain(|_, v| !v.is_null());
            Ok(object)
        }
        other => Err(ShopifyError::InvalidArgument(format!(
            "request body must serialize to a JSON object, got {}",
            kind(&other)
        ))),
    }
}

/// Decode a single entity stored under `key`.
///
/// # Errors
///
/// Returns [`ShopifyError::ProtocolMismatch`] if the body is empty, is not a
/// JSON object, lacks `key`, or the member does not match `T`.
pub fn decode<T: DeserializeOwned>(raw: &str, key: &str) -> Result<T> {
    let member = extract(raw, key)?;
    serde_json::from_value(member).map_err(|e| {
        ShopifyError::ProtocolMismatch(format!("'{key}' did not match the expected shape: {e}"))
    })
}

/// Decode a list of entities stored under `key`.
///
/// # Errors
///
/// Same conditions as [`decode`], plus a member that is not an array.
pub fn decode_list<T: DeserializeOwned>(raw: &str, key: &str) -> Result<Vec<T>> {
    let member = extract(raw, key)?;
    if !member.is_array() {
        return Err(ShopifyError::ProtocolMismatch(format!(
            "expected '{key}' to be an array, got {}",
            kind(&member)
        )));
    }
    serde_json::from_value(member).map_err(|e| {
        ShopifyError::ProtocolMismatch(format!("'{key}' did not match the expected shape: {e}"))
    })
}

/// Decode a body that carries no envelope.
pub fn decode_bare<T: DeserializeOwned>(raw: &str) -> Result<T> {
    serde_json::from_str(raw).map_err(|e| {
        ShopifyError::ProtocolMismatch(format!("response did not match the expected shape: {e}"))
    })
}

fn extract(raw: &str, key: &str) -> Result<Value> {
    if raw.trim().is_empty() {
        return Err(ShopifyError::ProtocolMismatch(format!(
            "expected '{key}' but the response body was empty"
        )));
    }

    let value: Value = serde_json::from_str(raw)
        .map_err(|e| ShopifyError::ProtocolMismatch(format!("response is not valid JSON: {e}")))?;

    match value {
        Value::Object(mut object) => object.remove(key).ok_or_else(|| {
            let found: Vec<&str> = object.keys().map(String::as_str).collect();
            ShopifyError::ProtocolMismatch(format!(
                "expected '{key}' in response, found [{}]",
                found.join(", ")
            ))
        }),
        other => Err(ShopifyError::ProtocolMismatch(format!(
            "expected an object containing '{key}', got {}",
            kind(&other)
        ))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Widget {
        id: Option<u64>,
        name: String,
        #[serde(default)]
        color: Option<String>,
    }

    #[test]
    fn test_encode_wraps_and_drops_nulls() {
        let widget = Widget {
            id: None,
            name: "gear".to_string(),
            color: None,
        };

        let body = encode(&widget, "widget").unwrap();
        assert_eq!(body, json!({ "widget": { "name": "gear" } }));
    }

    #[test]
    fn test_encode_rejects_non_object() {
        let err = encode(&vec![1, 2, 3], "widget").unwrap_err();
        assert!(matches!(err, ShopifyError::InvalidArgument(_)));

        let err = encode(&json!({"a": 1}), "").unwrap_err();
        assert!(matches!(err, ShopifyError::InvalidArgument(_)));
    }

    #[test]
    fn test_round_trip_with_same_key() {
        let widget = Widget {
            id: Some(7),
            name: "gear".to_string(),
            color: Some("red".to_string()),
        };

        let body = encode(&widget, "widget").unwrap().to_string();
        let decoded: Widget = decode(&body, "widget").unwrap();
        assert_eq!(decoded, widget);
    }

    #[test]
    fn test_decode_missing_key_is_protocol_mismatch() {
        let raw = r#"{"gadget": {"name": "gear"}}"#;
        let err = decode::<Widget>(raw, "widget").unwrap_err();

        match err {
            ShopifyError::ProtocolMismatch(msg) => {
                assert!(msg.contains("widget"));
                assert!(msg.contains("gadget"));
            }
            other => panic!("expected ProtocolMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_empty_body_is_protocol_mismatch() {
        let err = decode::<Widget>("", "widget").unwrap_err();
        assert!(matches!(err, ShopifyError::ProtocolMismatch(_)));

        let err = decode_list::<Widget>("  ", "widgets").unwrap_err();
        assert!(matches!(err, ShopifyError::ProtocolMismatch(_)));
    }

    #[test]
    fn test_decode_wrong_shape_is_protocol_mismatch() {
        let raw = r#"{"widget": {"id": 1}}"#;
        let err = decode::<Widget>(raw, "widget").unwrap_err();
        assert!(matches!(err, ShopifyError::ProtocolMismatch(_)));
    }

    #[test]
    fn test_decode_list() {
        let raw = r#"{"widgets": [{"id": 1, "name": "a"}, {"id": 2, "name": "b"}]}"#;
        let widgets: Vec<Widget> = decode_list(raw, "widgets").unwrap();
        assert_eq!(widgets.len(), 2);
        assert_eq!(widgets[1].name, "b");

        let err = decode_list::<Widget>(r#"{"widgets": {"id": 1}}"#, "widgets").unwrap_err();
        assert!(matches!(err, ShopifyError::ProtocolMismatch(_)));
    }

    #[test]
    fn test_decode_bare_count() {
        let count: u64 = decode(r#"{"count": 12}"#, "count").unwrap();
        assert_eq!(count, 12);

        let value: Value = decode_bare(r#"{"anything": true}"#).unwrap();
        assert_eq!(value["anything"], true);
    }
}
