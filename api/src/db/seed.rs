// api/src/db/seed.rs

//! Development seed data: one admin user and a small catalogue. Only runs against
//! an empty `users` table.

use crate::errors::Result;
use crate::services::auth_service;
use commerce_core::{Category, Role};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use tracing::{info, instrument, warn};

const SEED_PRODUCTS: [(&str, &str, i64, i32, Category); 5] = [
  ("USB-C Dock", "Seven-port dock with power delivery", 8999, 25, Category::Electronics),
  ("Rain Jacket", "Packable, seam-sealed shell", 12950, 40, Category::Clothing),
  ("Field Notes", "Pocket notebooks, pack of three", 1299, 200, Category::Books),
  ("Pour-Over Kettle", "Gooseneck kettle, 1 l", 4500, 15, Category::Home),
  ("Trail Bottle", "Insulated 750 ml bottle", 2400, 60, Category::Sports),
];

#[instrument(name = "db::seed_db", skip_all, err(Display))]
pub async fn seed_db(pool: &PgPool, admin_password: &SecretString) -> Result<()> {
  let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users").fetch_one(pool).await?;
  if existing > 0 {
    warn!(existing_users = existing, "Database already has users; skipping seed.");
    let admin_hash: Option<String> =
      sqlx::query_scalar("SELECT credential_hash FROM users WHERE role = $1 ORDER BY id LIMIT 1")
        .bind(Role::Admin.as_str())
        .fetch_optional(pool)
        .await?;
    if let Some(hash) = admin_hash {
      if !auth_service::verify_password(&hash, admin_password.expose_secret())? {
        warn!("SEED_ADMIN_PASSWORD does not match the stored admin credential.");
      }
    }
    return Ok(());
  }

  let credential_hash = auth_service::hash_password(admin_password.expose_secret())?;

  let mut tx = pool.begin().await?;
  let admin_id: i64 =
    sqlx::query_scalar("INSERT INTO users (name, email, credential_hash, role) VALUES ($1, $2, $3, $4) RETURNING id")
      .bind("admin")
      .bind("admin@example.com")
      .bind(&credential_hash)
      .bind(Role::Admin.as_str())
      .fetch_one(&mut *tx)
      .await?;

  for (name, description, price_cents, stock, category) in SEED_PRODUCTS {
    sqlx::query("INSERT INTO products (name, description, price, stock, category) VALUES ($1, $2, $3, $4, $5)")
      .bind(name)
      .bind(description)
      .bind(Decimal::new(price_cents, 2))
      .bind(stock)
      .bind(category.as_str())
      .execute(&mut *tx)
      .await?;
  }
  tx.commit().await?;

  info!(admin_id, products = SEED_PRODUCTS.len(), "Database seeded.");
  Ok(())
}
