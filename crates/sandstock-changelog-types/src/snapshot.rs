//! Entity snapshots and per-field change history.

use crate::FieldValue;

/// Ordered column name to value mapping of one entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntitySnapshot {
    fields: Vec<(&'static str, FieldValue)>,
}

impl EntitySnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column (builder style).
    pub fn with(mut self, name: &'static str, value: impl Into<FieldValue>) -> Self {
        self.push(name, value);
        self
    }

    /// Append a column, replacing an existing value of the same name.
    pub fn push(&mut self, name: &'static str, value: impl Into<FieldValue>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Look up a column value.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    /// Iterate over columns in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.fields.iter().map(|(n, v)| (*n, v))
    }

    /// Column names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(n, _)| *n)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// History of a single attribute since it was last persisted.
///
/// When the attribute changed, `deleted` holds the previous value and
/// `added` the new one. An unchanged attribute has neither.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeHistory {
    pub deleted: Option<FieldValue>,
    pub added: Option<FieldValue>,
}

impl AttributeHistory {
    /// History for an attribute that did not change.
    pub fn unchanged() -> Self {
        Self::default()
    }

    /// History for an attribute that moved from `old` to `new`.
    pub fn changed(old: FieldValue, new: FieldValue) -> Self {
        Self {
            deleted: Some(old),
            added: Some(new),
        }
    }

    pub fn has_changes(&self) -> bool {
        self.added.is_some() || self.deleted.is_some()
    }
}

/// Change history of every persisted attribute of an entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeHistory {
    attributes: Vec<(&'static str, AttributeHistory)>,
}

impl ChangeHistory {
    /// Compare the last persisted state with the current in-memory state.
    ///
    /// Attributes missing from `persisted` are reported as changed from NULL.
    pub fn between(persisted: &EntitySnapshot, current: &EntitySnapshot) -> Self {
        let attributes = current
            .iter()
            .map(|(name, value)| {
                let history = match persisted.get(name) {
                    Some(old) if old == value => AttributeHistory::unchanged(),
                    Some(old) => AttributeHistory::changed(old.clone(), value.clone()),
                    None => AttributeHistory::changed(FieldValue::Null, value.clone()),
                };
                (name, history)
            })
            .collect();
        Self { attributes }
    }

    /// History of a named attribute.
    pub fn get(&self, name: &str) -> Option<&AttributeHistory> {
        self.attributes.iter().find(|(n, _)| *n == name).map(|(_, h)| h)
    }

    /// Attributes whose history reports a change, in declaration order.
    pub fn changed_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.attributes
            .iter()
            .filter(|(_, h)| h.has_changes())
            .map(|(n, _)| *n)
    }

    pub fn has_changes(&self) -> bool {
        self.attributes.iter().any(|(_, h)| h.has_changes())
    }
}
