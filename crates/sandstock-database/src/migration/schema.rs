//! Bundled Sandstock schema.
//!
//! Timestamps are stored as RFC 3339 text, booleans as integers.

use super::Migration;

const CREATE_USER: &str = r#"
CREATE TABLE IF NOT EXISTS dim_user (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted INTEGER NOT NULL DEFAULT 0
)
"#;

const CREATE_CONTACT: &str = r#"
CREATE TABLE IF NOT EXISTS dim_contact (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT,
    phone_number TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    modified_by INTEGER NOT NULL REFERENCES dim_user(id),
    deleted INTEGER NOT NULL DEFAULT 0
)
"#;

const CREATE_ADDRESS: &str = r#"
CREATE TABLE IF NOT EXISTS dim_address (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    street_address TEXT NOT NULL,
    city TEXT NOT NULL,
    state TEXT NOT NULL,
    postal_code TEXT NOT NULL,
    country TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    modified_by INTEGER NOT NULL REFERENCES dim_user(id),
    deleted INTEGER NOT NULL DEFAULT 0
)
"#;

const CREATE_PARTNER: &str = r#"
CREATE TABLE IF NOT EXISTS dim_partner (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    contact_person TEXT,
    address_id INTEGER NOT NULL REFERENCES dim_address(id),
    contact_id INTEGER NOT NULL REFERENCES dim_contact(id),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    modified_by INTEGER NOT NULL REFERENCES dim_user(id),
    deleted INTEGER NOT NULL DEFAULT 0
)
"#;

const CREATE_WAREHOUSE: &str = r#"
CREATE TABLE IF NOT EXISTS dim_warehouse (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    address_id INTEGER NOT NULL REFERENCES dim_address(id),
    contact_id INTEGER NOT NULL REFERENCES dim_contact(id),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    modified_by INTEGER NOT NULL REFERENCES dim_user(id),
    deleted INTEGER NOT NULL DEFAULT 0
)
"#;

const CREATE_PRODUCT: &str = r#"
CREATE TABLE IF NOT EXISTS dim_product (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    category_label TEXT NOT NULL,
    description TEXT NOT NULL,
    quantity_available INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    modified_by INTEGER NOT NULL REFERENCES dim_user(id),
    deleted INTEGER NOT NULL DEFAULT 0
)
"#;

const CREATE_ORDER: &str = r#"
CREATE TABLE IF NOT EXISTS fact_order (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    category TEXT NOT NULL,
    product_id INTEGER NOT NULL REFERENCES dim_product(id),
    partner_id INTEGER NOT NULL REFERENCES dim_partner(id),
    warehouse_id INTEGER NOT NULL REFERENCES dim_warehouse(id),
    quantity INTEGER NOT NULL,
    unit_price REAL NOT NULL,
    currency TEXT NOT NULL,
    created_at TEXT NOT NULL,
    modified_by INTEGER NOT NULL REFERENCES dim_user(id)
)
"#;

const CREATE_CHANGE_LOG: &str = r#"
CREATE TABLE IF NOT EXISTS change_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    table_name TEXT NOT NULL,
    operation TEXT NOT NULL CHECK (operation IN ('INSERT', 'UPDATE', 'DELETE')),
    old_data TEXT,
    new_data TEXT,
    created_at TEXT NOT NULL,
    CHECK (old_data IS NOT NULL OR new_data IS NOT NULL)
)
"#;

const INDEX_CHANGE_LOG_TABLE: &str =
    "CREATE INDEX IF NOT EXISTS idx_change_log_table ON change_log (table_name, id)";

/// Every schema migration in application order.
pub fn migrations() -> Vec<Migration> {
    vec![
        Migration::new(1, "create_dim_user", CREATE_USER),
        Migration::new(2, "create_dim_contact", CREATE_CONTACT),
        Migration::new(3, "create_dim_address", CREATE_ADDRESS),
        Migration::new(4, "create_dim_partner", CREATE_PARTNER),
        Migration::new(5, "create_dim_warehouse", CREATE_WAREHOUSE),
        Migration::new(6, "create_dim_product", CREATE_PRODUCT),
        Migration::new(7, "create_fact_order", CREATE_ORDER),
        Migration::new(8, "create_change_log", CREATE_CHANGE_LOG),
        Migration::new(9, "index_change_log_table", INDEX_CHANGE_LOG_TABLE),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_versions_are_sequential() {
        let versions: Vec<i64> = migrations().iter().map(|m| m.version).collect();
        let expected: Vec<i64> = (1..=versions.len() as i64).collect();
        assert_eq!(versions, expected);
    }
}
