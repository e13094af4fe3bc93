use crate::store::Entity;
use chrono::{DateTime, Utc};
use sandstock_changelog_types::EntitySnapshot;
use serde::Serialize;

/// Application user; referenced by `modified_by` on every other entity.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: Option<i64>,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted: bool,
}

impl User {
    pub fn new(username: impl Into<String>, email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            created_at: now,
            updated_at: now,
            deleted: false,
        }
    }
}

impl Entity for User {
    const TABLE: &'static str = "dim_user";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn fields(&self) -> EntitySnapshot {
        EntitySnapshot::new()
            .with("id", self.id)
            .with("username", self.username.as_str())
            .with("email", self.email.as_str())
            .with("password_hash", self.password_hash.as_str())
            .with("created_at", self.created_at)
            .with("updated_at", self.updated_at)
            .with("deleted", self.deleted)
    }
}
