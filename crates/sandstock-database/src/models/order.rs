use crate::store::Entity;
use chrono::{DateTime, Utc};
use sandstock_changelog_types::EntitySnapshot;
use serde::Serialize;
use strum::{Display, EnumString};

/// Kind of order ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum OrderCategory {
    Transaction,
    Correction,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: Option<i64>,
    pub category: String,
    pub product_id: i64,
    pub partner_id: i64,
    pub warehouse_id: i64,
    pub quantity: i64,
    pub unit_price: f64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub modified_by: i64,
}

impl Order {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        category: OrderCategory,
        product_id: i64,
        partner_id: i64,
        warehouse_id: i64,
        quantity: i64,
        unit_price: f64,
        currency: impl Into<String>,
        modified_by: i64,
    ) -> Self {
        Self {
            id: None,
            category: category.to_string(),
            product_id,
            partner_id,
            warehouse_id,
            quantity,
            unit_price,
            currency: currency.into(),
            created_at: Utc::now(),
            modified_by,
        }
    }

    pub fn total(&self) -> f64 {
        self.quantity as f64 * self.unit_price
    }
}

impl Entity for Order {
    const TABLE: &'static str = "fact_order";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn fields(&self) -> EntitySnapshot {
        EntitySnapshot::new()
            .with("id", self.id)
            .with("category", self.category.as_str())
            .with("product_id", self.product_id)
            .with("partner_id", self.partner_id)
            .with("warehouse_id", self.warehouse_id)
            .with("quantity", self.quantity)
            .with("unit_price", self.unit_price)
            .with("currency", self.currency.as_str())
            .with("created_at", self.created_at)
            .with("modified_by", self.modified_by)
    }
}
