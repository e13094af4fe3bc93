//! Mutation operations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Kind of low-level mutation recorded in a change log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumIter, EnumString)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Operation {
    /// A new row was inserted.
    Insert,
    /// An existing row was updated.
    Update,
    /// A row was deleted.
    Delete,
}

impl Operation {
    /// All operations, in hook registration order.
    pub fn all() -> impl Iterator<Item = Self> {
        use strum::IntoEnumIterator;
        Self::iter()
    }

    /// Whether records of this operation carry the previous values.
    pub fn has_old_data(&self) -> bool {
        matches!(self, Self::Update | Self::Delete)
    }

    /// Whether records of this operation carry the new values.
    pub fn has_new_data(&self) -> bool {
        matches!(self, Self::Insert | Self::Update)
    }
}
