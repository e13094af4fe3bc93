use crate::store::Entity;
use chrono::{DateTime, Utc};
use sandstock_changelog_types::EntitySnapshot;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Address {
    pub id: Option<i64>,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub modified_by: i64,
    pub deleted: bool,
}

impl Address {
    pub fn new(
        street_address: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        postal_code: impl Into<String>,
        country: impl Into<String>,
        modified_by: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            street_address: street_address.into(),
            city: city.into(),
            state: state.into(),
            postal_code: postal_code.into(),
            country: country.into(),
            created_at: now,
            updated_at: now,
            modified_by,
            deleted: false,
        }
    }
}

impl Entity for Address {
    const TABLE: &'static str = "dim_address";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn fields(&self) -> EntitySnapshot {
        EntitySnapshot::new()
            .with("id", self.id)
            .with("street_address", self.street_address.as_str())
            .with("city", self.city.as_str())
            .with("state", self.state.as_str())
            .with("postal_code", self.postal_code.as_str())
            .with("country", self.country.as_str())
            .with("created_at", self.created_at)
            .with("updated_at", self.updated_at)
            .with("modified_by", self.modified_by)
            .with("deleted", self.deleted)
    }
}
