use crate::store::Entity;
use chrono::{DateTime, Utc};
use sandstock_changelog_types::EntitySnapshot;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Contact {
    pub id: Option<i64>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub modified_by: i64,
    pub deleted: bool,
}

impl Contact {
    pub fn new(email: Option<String>, phone_number: Option<String>, modified_by: i64) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            email,
            phone_number,
            created_at: now,
            updated_at: now,
            modified_by,
            deleted: false,
        }
    }
}

impl Entity for Contact {
    const TABLE: &'static str = "dim_contact";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn fields(&self) -> EntitySnapshot {
        EntitySnapshot::new()
            .with("id", self.id)
            .with("email", self.email.clone())
            .with("phone_number", self.phone_number.clone())
            .with("created_at", self.created_at)
            .with("updated_at", self.updated_at)
            .with("modified_by", self.modified_by)
            .with("deleted", self.deleted)
    }
}
