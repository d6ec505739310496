// api/src/models/product.rs

use commerce_core::{Category, Product, StoreError};
use rust_decimal::Decimal;
use sqlx::FromRow;

/// `products` row. `category` is stored as TEXT in its snake_case spelling.
#[derive(Debug, Clone, FromRow)]
pub struct ProductRow {
  pub id: i64,
  pub name: String,
  pub description: Option<String>,
  pub price: Decimal,
  pub stock: i32,
  pub category: String,
}

impl TryFrom<ProductRow> for Product {
  type Error = StoreError;

  fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
    let category = row
      .category
      .parse::<Category>()
      .map_err(|e| StoreError::backend(anyhow::anyhow!("product {}: {}", row.id, e)))?;
    Ok(Product {
      id: row.id,
      name: row.name,
      description: row.description,
      price: row.price,
      stock: row.stock,
      category,
    })
  }
}
