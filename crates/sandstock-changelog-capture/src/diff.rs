//! Before/after field diffs of a single mutation.

use sandstock_changelog_types::{
    encode_payload, CaptureError, FieldMap, FieldValue, MutationEvent, NewChangeLog, Operation,
};

/// Previous and new values of the fields a mutation touched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diff {
    pub old: FieldMap,
    pub new: FieldMap,
}

impl Diff {
    pub fn is_empty(&self) -> bool {
        self.old.is_empty() && self.new.is_empty()
    }

    /// Encode into a change log, or `None` for an empty diff.
    ///
    /// An empty side of the diff is stored as absent, never as `{}`.
    pub fn into_record(self, table: &str, operation: Operation) -> Result<Option<NewChangeLog>, CaptureError> {
        let old_data = encode_side(&self.old)?;
        let new_data = encode_side(&self.new)?;
        Ok(NewChangeLog::new(table, operation, old_data, new_data))
    }
}

fn encode_side(fields: &FieldMap) -> Result<Option<String>, CaptureError> {
    if fields.is_empty() {
        return Ok(None);
    }
    encode_payload(fields).map(Some)
}

fn insert_json(
    map: &mut FieldMap,
    table: &str,
    field: &str,
    value: &FieldValue,
) -> Result<(), CaptureError> {
    let json = value
        .to_json()
        .map_err(|reason| CaptureError::unserializable(table, field, reason))?;
    map.insert(field.to_string(), json);
    Ok(())
}

/// Compute the diff recorded for `operation`.
///
/// - insert: every persisted field as new values
/// - delete: every persisted field as old values
/// - update: only fields whose history reports a change, on both sides
pub fn compute_diff(operation: Operation, event: &MutationEvent<'_>) -> Result<Diff, CaptureError> {
    let mut diff = Diff::default();

    match operation {
        Operation::Insert => {
            for (field, value) in event.snapshot.iter() {
                insert_json(&mut diff.new, event.table, field, value)?;
            }
        }
        Operation::Delete => {
            for (field, value) in event.snapshot.iter() {
                insert_json(&mut diff.old, event.table, field, value)?;
            }
        }
        Operation::Update => {
            let Some(history) = event.history else {
                return Ok(diff);
            };
            for field in history.changed_fields() {
                let Some(attr) = history.get(field) else {
                    continue;
                };
                let old = attr.deleted.clone().unwrap_or(FieldValue::Null);
                let new = attr.added.clone().unwrap_or(FieldValue::Null);
                insert_json(&mut diff.old, event.table, field, &old)?;
                insert_json(&mut diff.new, event.table, field, &new)?;
            }
        }
    }

    Ok(diff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sandstock_changelog_types::{decode_payload, ChangeHistory, EntitySnapshot};
    use serde_json::{json, Value};
    use test_case::test_case;

    fn product(qty: i64) -> EntitySnapshot {
        EntitySnapshot::new().with("name", "X").with("qty", qty)
    }

    fn as_map(value: Value) -> FieldMap {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_insert_captures_all_fields() {
        let snapshot = product(5);
        let diff = compute_diff(Operation::Insert, &MutationEvent::new("dim_product", &snapshot)).unwrap();

        assert_eq!(diff.new, as_map(json!({"name": "X", "qty": 5})));
        assert!(diff.old.is_empty());

        let record = diff.into_record("dim_product", Operation::Insert).unwrap().unwrap();
        assert!(record.old_data.is_none());
        assert_eq!(
            decode_payload(record.new_data.as_deref().unwrap()).unwrap(),
            as_map(json!({"name": "X", "qty": 5}))
        );
    }

    #[test]
    fn test_payload_follows_column_order() {
        let snapshot = EntitySnapshot::new()
            .with("quantity_available", 5i64)
            .with("name", "X")
            .with("category_label", "Toys");
        let diff = compute_diff(Operation::Insert, &MutationEvent::new("dim_product", &snapshot)).unwrap();
        let record = diff.into_record("dim_product", Operation::Insert).unwrap().unwrap();

        assert_eq!(
            record.new_data.as_deref().unwrap(),
            "{\n    \"quantity_available\": 5,\n    \"name\": \"X\",\n    \"category_label\": \"Toys\"\n}"
        );
    }

    #[test]
    fn test_delete_captures_all_fields() {
        let snapshot = product(5);
        let diff = compute_diff(Operation::Delete, &MutationEvent::new("dim_product", &snapshot)).unwrap();

        assert_eq!(diff.old, as_map(json!({"name": "X", "qty": 5})));
        assert!(diff.new.is_empty());

        let record = diff.into_record("dim_product", Operation::Delete).unwrap().unwrap();
        assert!(record.new_data.is_none());
        assert!(record.old_data.is_some());
    }

    #[test_case(5, 10, Some((json!({"qty": 5}), json!({"qty": 10}))) ; "changed quantity")]
    #[test_case(5, 5, None ; "no-op update")]
    fn test_update_diff(before: i64, after: i64, expected: Option<(Value, Value)>) {
        let persisted = product(before);
        let current = product(after);
        let history = ChangeHistory::between(&persisted, &current);
        let event = MutationEvent::new("dim_product", &current).with_history(&history);

        let diff = compute_diff(Operation::Update, &event).unwrap();
        match expected {
            Some((old, new)) => {
                assert_eq!(diff.old, as_map(old));
                assert_eq!(diff.new, as_map(new));
            }
            None => {
                assert!(diff.is_empty());
                assert!(diff.into_record("dim_product", Operation::Update).unwrap().is_none());
            }
        }
    }

    #[test]
    fn test_update_to_null() {
        let persisted = EntitySnapshot::new().with("email", "a@example.com");
        let current = EntitySnapshot::new().with("email", Option::<String>::None);
        let history = ChangeHistory::between(&persisted, &current);
        let event = MutationEvent::new("dim_contact", &current).with_history(&history);

        let diff = compute_diff(Operation::Update, &event).unwrap();
        assert_eq!(diff.old, as_map(json!({"email": "a@example.com"})));
        assert_eq!(diff.new, as_map(json!({"email": null})));
    }

    #[test]
    fn test_update_without_history_is_empty() {
        let snapshot = product(5);
        let diff = compute_diff(Operation::Update, &MutationEvent::new("dim_product", &snapshot)).unwrap();
        assert!(diff.is_empty());
    }

    #[test_case(Operation::Insert ; "insert")]
    #[test_case(Operation::Delete ; "delete")]
    fn test_non_finite_float_is_unserializable(operation: Operation) {
        let snapshot = EntitySnapshot::new().with("unit_price", f64::NAN);
        let err = compute_diff(operation, &MutationEvent::new("fact_order", &snapshot)).unwrap_err();
        assert!(matches!(
            err,
            CaptureError::Unserializable { ref table, ref field, .. }
                if table == "fact_order" && field == "unit_price"
        ));
    }
}
