use std::collections::HashMap;
use std::fmt;

use anyhow::Context;
use clap::{Args, ValueEnum};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use sandstock_database::models::{
    Address, Contact, Order, OrderCategory, Partner, Product, User, Warehouse,
};
use sandstock_database::{Entity, Tracked, UnitOfWork};
use tracing::{info, instrument};

use crate::app::App;

const PRODUCT_CATEGORIES: [&str; 5] = ["Electronics", "Furniture", "Clothing", "Books", "Toys"];
const CURRENCIES: [&str; 2] = ["USD", "EUR"];
const ORDER_CATEGORIES: [OrderCategory; 2] = [OrderCategory::Transaction, OrderCategory::Correction];

/// Seeded accounts share one placeholder credential.
const PLACEHOLDER_PASSWORD_HASH: &str = "!seeded";

/// How much data to generate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Scale {
    Small,
    #[default]
    Full,
}

/// Number of rows generated per entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedCounts {
    pub users: usize,
    pub contacts: usize,
    pub addresses: usize,
    pub products: usize,
    pub partners: usize,
    pub warehouses: usize,
    pub orders: usize,
}

impl SeedCounts {
    /// Change logs a seed run produces: one per inserted row plus one
    /// product restock per order.
    pub fn expected_change_logs(&self) -> usize {
        self.users
            + self.contacts
            + self.addresses
            + self.products
            + self.partners
            + self.warehouses
            + self.orders * 2
    }
}

impl Scale {
    pub fn counts(self) -> SeedCounts {
        match self {
            Scale::Small => SeedCounts {
                users: 3,
                contacts: 5,
                addresses: 5,
                products: 10,
                partners: 5,
                warehouses: 2,
                orders: 50,
            },
            Scale::Full => SeedCounts {
                users: 10,
                contacts: 50,
                addresses: 50,
                products: 100,
                partners: 50,
                warehouses: 5,
                orders: 1000,
            },
        }
    }
}

/// Populate an empty database with generated inventory data
#[derive(Debug, Args)]
pub struct SeedCommand {
    /// Amount of data to generate
    #[arg(long, value_enum, default_value_t = Scale::Full)]
    pub scale: Scale,

    /// Random seed; the same seed generates the same data
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

#[derive(Debug)]
pub struct SeedReport {
    pub counts: SeedCounts,
    /// Rows in `change_log` after the run.
    pub change_logs: i64,
}

impl SeedCommand {
    #[instrument(skip_all, fields(scale = ?self.scale, seed = self.seed))]
    pub async fn execute(&self, app: &App) -> anyhow::Result<SeedReport> {
        let counts = self.scale.counts();
        let mut seeder = Seeder {
            app,
            rng: StdRng::seed_from_u64(self.seed),
        };

        seeder.ensure_empty().await?;

        let users = seeder.users(counts.users).await?;
        let contacts = seeder.contacts(counts.contacts, &users).await?;
        let addresses = seeder.addresses(counts.addresses, &users).await?;
        let products = seeder.products(counts.products, &users).await?;
        let partners = seeder.partners(counts.partners, &addresses, &contacts, &users).await?;
        let warehouses = seeder
            .warehouses(counts.warehouses, &addresses, &contacts, &users)
            .await?;
        seeder
            .orders(counts.orders, &products, &partners, &warehouses, &users)
            .await?;

        if let Some(queue) = app.queue() {
            queue.flush(app.changelog()).await?;
        }

        let change_logs = app.changelog().count().await?;
        info!(change_logs, "Seed complete");

        Ok(SeedReport {
            counts,
            change_logs,
        })
    }
}

struct Seeder<'a> {
    app: &'a App,
    rng: StdRng,
}

impl Seeder<'_> {
    async fn ensure_empty(&self) -> anyhow::Result<()> {
        let mut uow = self.app.store().begin().await?;
        let existing = uow.list::<User>(1).await?;
        uow.rollback().await?;

        if !existing.is_empty() {
            anyhow::bail!("database already contains users; seed an empty database");
        }
        Ok(())
    }

    fn pick(&mut self, ids: &[i64], what: &str) -> anyhow::Result<i64> {
        ids.choose(&mut self.rng)
            .copied()
            .with_context(|| format!("no {what} to reference"))
    }

    async fn users(&mut self, count: usize) -> anyhow::Result<Vec<i64>> {
        let mut uow = self.app.store().begin().await?;
        let mut ids = Vec::with_capacity(count);
        for i in 1..=count {
            let username = format!("user {i}");
            let email = format!("{username}@example.com");
            let user = User::new(username, email, PLACEHOLDER_PASSWORD_HASH);
            ids.push(insert(&mut uow, user).await?);
        }
        commit(uow, User::TABLE).await?;
        Ok(ids)
    }

    async fn contacts(&mut self, count: usize, users: &[i64]) -> anyhow::Result<Vec<i64>> {
        let mut uow = self.app.store().begin().await?;
        let mut ids = Vec::with_capacity(count);
        for i in 1..=count {
            let contact = Contact::new(
                Some(format!("contact{i}@example.com")),
                Some(format!("123-456-789{}", i - 1)),
                self.pick(users, "users")?,
            );
            ids.push(insert(&mut uow, contact).await?);
        }
        commit(uow, Contact::TABLE).await?;
        Ok(ids)
    }

    async fn addresses(&mut self, count: usize, users: &[i64]) -> anyhow::Result<Vec<i64>> {
        let mut uow = self.app.store().begin().await?;
        let mut ids = Vec::with_capacity(count);
        for i in 1..=count {
            let address = Address::new(
                format!("{i} Example Street"),
                format!("City{i}"),
                format!("State{i}"),
                format!("12345{}", i - 1),
                "Example Country",
                self.pick(users, "users")?,
            );
            ids.push(insert(&mut uow, address).await?);
        }
        commit(uow, Address::TABLE).await?;
        Ok(ids)
    }

    async fn products(&mut self, count: usize, users: &[i64]) -> anyhow::Result<Vec<i64>> {
        let mut uow = self.app.store().begin().await?;
        let mut ids = Vec::with_capacity(count);
        for i in 1..=count {
            let name = format!("Product {i}");
            let category = PRODUCT_CATEGORIES[self.rng.gen_range(0..PRODUCT_CATEGORIES.len())];
            let description = format!("Description for {name}");
            let product = Product::new(name, category, description, 0, self.pick(users, "users")?);
            ids.push(insert(&mut uow, product).await?);
        }
        commit(uow, Product::TABLE).await?;
        Ok(ids)
    }

    async fn partners(
        &mut self,
        count: usize,
        addresses: &[i64],
        contacts: &[i64],
        users: &[i64],
    ) -> anyhow::Result<Vec<i64>> {
        let mut uow = self.app.store().begin().await?;
        let mut ids = Vec::with_capacity(count);
        for i in 1..=count {
            let partner = Partner::new(
                format!("Partner {i}"),
                Some(format!("Contact Person {i}")),
                self.pick(addresses, "addresses")?,
                self.pick(contacts, "contacts")?,
                self.pick(users, "users")?,
            );
            ids.push(insert(&mut uow, partner).await?);
        }
        commit(uow, Partner::TABLE).await?;
        Ok(ids)
    }

    async fn warehouses(
        &mut self,
        count: usize,
        addresses: &[i64],
        contacts: &[i64],
        users: &[i64],
    ) -> anyhow::Result<Vec<i64>> {
        let mut uow = self.app.store().begin().await?;
        let mut ids = Vec::with_capacity(count);
        for i in 1..=count {
            let warehouse = Warehouse::new(
                format!("Warehouse {i}"),
                self.pick(addresses, "addresses")?,
                self.pick(contacts, "contacts")?,
                self.pick(users, "users")?,
            );
            ids.push(insert(&mut uow, warehouse).await?);
        }
        commit(uow, Warehouse::TABLE).await?;
        Ok(ids)
    }

    /// Insert orders and add each ordered quantity to its product's stock.
    async fn orders(
        &mut self,
        count: usize,
        products: &[i64],
        partners: &[i64],
        warehouses: &[i64],
        users: &[i64],
    ) -> anyhow::Result<()> {
        let mut uow = self.app.store().begin().await?;
        let mut stock: HashMap<i64, Tracked<Product>> = HashMap::new();

        for _ in 0..count {
            let product_id = self.pick(products, "products")?;
            let quantity = self.rng.gen_range(1..=200);
            let unit_price = (self.rng.gen_range(10.0..1000.0_f64) * 100.0).round() / 100.0;
            let modified_by = self.pick(users, "users")?;

            let order = Order::new(
                ORDER_CATEGORIES[self.rng.gen_range(0..ORDER_CATEGORIES.len())],
                product_id,
                self.pick(partners, "partners")?,
                self.pick(warehouses, "warehouses")?,
                quantity,
                unit_price,
                CURRENCIES[self.rng.gen_range(0..CURRENCIES.len())],
                modified_by,
            );
            insert(&mut uow, order).await?;

            let product = match stock.entry(product_id) {
                std::collections::hash_map::Entry::Occupied(entry) => entry.into_mut(),
                std::collections::hash_map::Entry::Vacant(entry) => {
                    entry.insert(uow.get::<Product>(product_id).await?)
                }
            };
            let restocked = product.quantity_available + quantity;
            product.restock(restocked, modified_by);
            uow.update(product).await?;
        }

        commit(uow, Order::TABLE).await?;
        Ok(())
    }
}

async fn insert<E: Entity>(uow: &mut UnitOfWork, entity: E) -> anyhow::Result<i64> {
    let tracked = uow.insert(entity).await?;
    tracked
        .id()
        .with_context(|| format!("{} insert returned no id", E::TABLE))
}

async fn commit(uow: UnitOfWork, table: &'static str) -> anyhow::Result<()> {
    let written = uow.commit().await?;
    info!(table, change_logs = written, "Seeded");
    Ok(())
}

impl fmt::Display for SeedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.counts;
        writeln!(f, "Seeded:")?;
        writeln!(f, "  users       {:>5}", c.users)?;
        writeln!(f, "  contacts    {:>5}", c.contacts)?;
        writeln!(f, "  addresses   {:>5}", c.addresses)?;
        writeln!(f, "  products    {:>5}", c.products)?;
        writeln!(f, "  partners    {:>5}", c.partners)?;
        writeln!(f, "  warehouses  {:>5}", c.warehouses)?;
        writeln!(f, "  orders      {:>5}", c.orders)?;
        writeln!(f, "Change logs: {}", self.change_logs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_change_logs_counts_restocks() {
        let counts = Scale::Small.counts();
        assert_eq!(counts.expected_change_logs(), 3 + 5 + 5 + 10 + 5 + 2 + 100);
        assert_eq!(Scale::Full.counts().expected_change_logs(), 265 + 2000);
    }
}
