//! Change log records.

use crate::{decode_payload, CaptureError, FieldMap, Operation};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A change log captured in memory but not yet persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewChangeLog {
    /// Table of the mutated entity.
    pub table_name: String,
    /// Mutation kind.
    pub operation: Operation,
    /// JSON object of previous values (absent for inserts).
    pub old_data: Option<String>,
    /// JSON object of new values (absent for deletes).
    pub new_data: Option<String>,
    /// When the mutation was captured.
    pub created_at: DateTime<Utc>,
}

impl NewChangeLog {
    /// Create a record stamped with the current time.
    ///
    /// Returns `None` when both payloads are absent: a change log always
    /// carries at least one side of the diff.
    pub fn new(
        table_name: impl Into<String>,
        operation: Operation,
        old_data: Option<String>,
        new_data: Option<String>,
    ) -> Option<Self> {
        if old_data.is_none() && new_data.is_none() {
            return None;
        }
        Some(Self {
            table_name: table_name.into(),
            operation,
            old_data,
            new_data,
            created_at: Utc::now(),
        })
    }

    /// Attach the storage-assigned id.
    pub fn into_persisted(self, id: i64) -> ChangeLog {
        ChangeLog {
            id,
            table_name: self.table_name,
            operation: self.operation,
            old_data: self.old_data,
            new_data: self.new_data,
            created_at: self.created_at,
        }
    }
}

/// A persisted, immutable change log row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeLog {
    /// Storage-assigned, monotonically increasing id.
    pub id: i64,
    pub table_name: String,
    pub operation: Operation,
    pub old_data: Option<String>,
    pub new_data: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ChangeLog {
    /// Parse the previous values.
    pub fn old_values(&self) -> Result<Option<FieldMap>, CaptureError> {
        self.old_data.as_deref().map(decode_payload).transpose()
    }

    /// Parse the new values.
    pub fn new_values(&self) -> Result<Option<FieldMap>, CaptureError> {
        self.new_data.as_deref().map(decode_payload).transpose()
    }

    /// One-line description for listings.
    pub fn summary(&self) -> String {
        let fields = |data: &Option<String>| {
            data.as_deref()
                .and_then(|text| decode_payload(text).ok())
                .map(|map| map.keys().cloned().collect::<Vec<_>>().join(","))
                .unwrap_or_else(|| "-".to_string())
        };
        format!(
            "#{} [{}] {} {} old=({}) new=({})",
            self.id,
            self.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.operation,
            self.table_name,
            fields(&self.old_data),
            fields(&self.new_data),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_requires_some_data() {
        assert!(NewChangeLog::new("dim_product", Operation::Update, None, None).is_none());
        let record = NewChangeLog::new(
            "dim_product",
            Operation::Insert,
            None,
            Some("{\"qty\": 5}".into()),
        )
        .unwrap();
        assert_eq!(record.table_name, "dim_product");
        assert_eq!(record.operation, Operation::Insert);
    }

    #[test]
    fn test_persisted_values_parse() {
        let log = NewChangeLog::new(
            "dim_product",
            Operation::Update,
            Some("{\"qty\": 5}".into()),
            Some("{\"qty\": 10}".into()),
        )
        .unwrap()
        .into_persisted(3);

        assert_eq!(log.id, 3);
        let old = log.old_values().unwrap().unwrap();
        let new = log.new_values().unwrap().unwrap();
        assert_eq!(old.get("qty"), Some(&json!(5)));
        assert_eq!(new.get("qty"), Some(&json!(10)));
    }

    #[test]
    fn test_summary_lists_fields() {
        let log = NewChangeLog::new(
            "fact_order",
            Operation::Delete,
            Some("{\"id\": 1, \"quantity\": 4}".into()),
            None,
        )
        .unwrap()
        .into_persisted(12);

        let line = log.summary();
        assert!(line.starts_with("#12 ["));
        assert!(line.contains("DELETE fact_order"));
        assert!(line.contains("old=(id,quantity)"));
        assert!(line.contains("new=(-)"));
    }
}
