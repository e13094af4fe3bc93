//! Column values as seen by mutation hooks.

use chrono::{DateTime, Utc};
use serde_json::{Number, Value};

/// A single persisted column value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// SQL NULL.
    Null,
    /// Boolean column.
    Bool(bool),
    /// Integer column (ids, quantities, foreign keys).
    Integer(i64),
    /// Floating point column (prices).
    Float(f64),
    /// Text column.
    Text(String),
    /// Date/time column.
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    /// Convert to the JSON representation stored in change logs.
    ///
    /// Timestamps become ISO-8601 strings. Non-finite floats have no JSON
    /// representation and are reported as an error message.
    pub fn to_json(&self) -> Result<Value, String> {
        match self {
            Self::Null => Ok(Value::Null),
            Self::Bool(b) => Ok(Value::Bool(*b)),
            Self::Integer(i) => Ok(Value::Number((*i).into())),
            Self::Float(f) => Number::from_f64(*f)
                .map(Value::Number)
                .ok_or_else(|| format!("non-finite float {} is not representable in JSON", f)),
            Self::Text(s) => Ok(Value::String(s.clone())),
            Self::Timestamp(ts) => Ok(Value::String(ts.to_rfc3339())),
        }
    }

    /// Check for SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}
