use crate::store::Entity;
use chrono::{DateTime, Utc};
use sandstock_changelog_types::EntitySnapshot;
use serde::Serialize;

/// Trading partner (customer or supplier).
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Partner {
    pub id: Option<i64>,
    pub name: String,
    pub contact_person: Option<String>,
    pub address_id: i64,
    pub contact_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub modified_by: i64,
    pub deleted: bool,
}

impl Partner {
    pub fn new(
        name: impl Into<String>,
        contact_person: Option<String>,
        address_id: i64,
        contact_id: i64,
        modified_by: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            name: name.into(),
            contact_person,
            address_id,
            contact_id,
            created_at: now,
            updated_at: now,
            modified_by,
            deleted: false,
        }
    }
}

impl Entity for Partner {
    const TABLE: &'static str = "dim_partner";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn fields(&self) -> EntitySnapshot {
        EntitySnapshot::new()
            .with("id", self.id)
            .with("name", self.name.as_str())
            .with("contact_person", self.contact_person.clone())
            .with("address_id", self.address_id)
            .with("contact_id", self.contact_id)
            .with("created_at", self.created_at)
            .with("updated_at", self.updated_at)
            .with("modified_by", self.modified_by)
            .with("deleted", self.deleted)
    }
}
