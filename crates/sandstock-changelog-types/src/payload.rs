//! JSON encoding of `old_data` / `new_data` payloads.

use crate::CaptureError;
use serde::Serialize;
use serde_json::{Map, Value};

/// Field name to JSON value mapping, in insertion order.
pub type FieldMap = Map<String, Value>;

/// Encode a field map as pretty-printed JSON with four-space indentation.
pub fn encode_payload(fields: &FieldMap) -> Result<String, CaptureError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    fields.serialize(&mut serializer)?;
    // serde_json only ever writes valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Decode a stored payload back into a field map.
pub fn decode_payload(text: &str) -> Result<FieldMap, CaptureError> {
    match serde_json::from_str::<Value>(text)? {
        Value::Object(map) => Ok(map),
        _ => Err(CaptureError::NotAnObject),
    }
}
