// JSON envelope decoding: {"status": "success", <key>: <payload>, ...}

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::ClientError;

pub(crate) const SUCCESS: &str = "success";

/// Parses a raw body and returns the envelope object if its status is "success".
pub(crate) fn parse(bytes: &[u8]) -> Result<Map<String, Value>, ClientError> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| ClientError::Decode(e.to_string()))?;
    let Value::Object(envelope) = value else {
        return Err(ClientError::Decode("envelope is not a JSON object".into()));
    };
    if envelope.get("status").and_then(Value::as_str) != Some(SUCCESS) {
        let message = envelope
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string);
        return Err(ClientError::Service { message });
    }
    Ok(envelope)
}

/// Required payload under `key`.
pub(crate) fn field<T: DeserializeOwned>(
    envelope: &mut Map<String, Value>,
    key: &str,
) -> Result<T, ClientError> {
    match envelope.remove(key) {
        None | Some(Value::Null) => Err(ClientError::Decode(format!("missing field `{key}`"))),
        Some(v) => serde_json::from_value(v)
            .map_err(|e| ClientError::Decode(format!("field `{key}`: {e}"))),
    }
}

/// List payload under `key`; absent or null is an empty list.
pub(crate) fn list<T: DeserializeOwned>(
    envelope: &mut Map<String, Value>,
    key: &str,
) -> Result<Vec<T>, ClientError> {
    match envelope.remove(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(v) => serde_json::from_value(v)
            .map_err(|e| ClientError::Decode(format!("field `{key}`: {e}"))),
    }
}

/// Whole envelope as `T` (action results read several optional top-level keys).
pub(crate) fn whole<T: DeserializeOwned>(envelope: Map<String, Value>) -> Result<T, ClientError> {
    serde_json::from_value(Value::Object(envelope)).map_err(|e| ClientError::Decode(e.to_string()))
}
