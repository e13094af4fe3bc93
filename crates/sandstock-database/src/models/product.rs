use crate::store::Entity;
use chrono::{DateTime, Utc};
use sandstock_changelog_types::EntitySnapshot;
use serde::Serialize;

/// Stock-keeping unit with its on-hand quantity.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: Option<i64>,
    pub name: String,
    pub category_label: String,
    pub description: String,
    pub quantity_available: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub modified_by: i64,
    pub deleted: bool,
}

impl Product {
    pub fn new(
        name: impl Into<String>,
        category_label: impl Into<String>,
        description: impl Into<String>,
        quantity_available: i64,
        modified_by: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            name: name.into(),
            category_label: category_label.into(),
            description: description.into(),
            quantity_available,
            created_at: now,
            updated_at: now,
            modified_by,
            deleted: false,
        }
    }

    /// Set the on-hand quantity and stamp the modification.
    pub fn restock(&mut self, quantity: i64, modified_by: i64) {
        self.quantity_available = quantity;
        self.modified_by = modified_by;
        self.updated_at = Utc::now();
    }
}

impl Entity for Product {
    const TABLE: &'static str = "dim_product";

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
            .with("category_label", self.category_label.as_str())
            .with("description", self.description.as_str())
            .with("quantity_available", self.quantity_available)
            .with("created_at", self.created_at)
            .with("updated_at", self.updated_at)
            .with("modified_by", self.modified_by)
            .with("deleted", self.deleted)
    }
}
