use std::fmt;

use clap::Args;
use sandstock_database::models::Product;
use tracing::instrument;

use crate::app::App;

/// Add stock to a product, recording the change
#[derive(Debug, Args)]
pub struct RestockCommand {
    /// Product id
    pub product_id: i64,

    /// Units to add
    pub quantity: i64,

    /// Id of the user performing the change
    #[arg(long, default_value_t = 1)]
    pub user: i64,
}

#[derive(Debug)]
pub struct RestockReport {
    pub product_id: i64,
    pub name: String,
    pub before: i64,
    pub after: i64,
}

impl RestockCommand {
    #[instrument(skip_all, fields(product_id = self.product_id, quantity = self.quantity))]
    pub async fn execute(&self, app: &App) -> anyhow::Result<RestockReport> {
        if self.quantity <= 0 {
            anyhow::bail!("quantity must be positive, got {}", self.quantity);
        }

        let mut uow = app.store().begin().await?;
        let mut product = uow.get::<Product>(self.product_id).await?;

        let before = product.quantity_available;
        let after = before
            .checked_add(self.quantity)
            .ok_or_else(|| anyhow::anyhow!("stock of product {} would overflow", self.product_id))?;

        product.restock(after, self.user);
        uow.update(&mut product).await?;
        uow.commit().await?;

        Ok(RestockReport {
            product_id: self.product_id,
            name: product.name.clone(),
            before,
            after,
        })
    }
}

impl fmt::Display for RestockReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} (#{}): {} -> {}",
            self.name, self.product_id, self.before, self.after
        )
    }
}
