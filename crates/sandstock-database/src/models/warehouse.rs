use crate::store::Entity;
use chrono::{DateTime, Utc};
use sandstock_changelog_types::EntitySnapshot;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Warehouse {
    pub id: Option<i64>,
    pub name: String,
    pub address_id: i64,
    pub contact_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub modified_by: i64,
    pub deleted: bool,
}

impl Warehouse {
    pub fn new(name: impl Into<String>, address_id: i64, contact_id: i64, modified_by: i64) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            name: name.into(),
            address_id,
            contact_id,
            created_at: now,
            updated_at: now,
            modified_by,
            deleted: false,
        }
    }
}

impl Entity for Warehouse {
    const TABLE: &'static str = "dim_warehouse";

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
            .with("address_id", self.address_id)
            .with("contact_id", self.contact_id)
            .with("created_at", self.created_at)
            .with("updated_at", self.updated_at)
            .with("modified_by", self.modified_by)
            .with("deleted", self.deleted)
    }
}
