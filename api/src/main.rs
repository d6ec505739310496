// api/src/main.rs

mod config;
mod db;
mod errors;
mod models;
mod services;
mod state;
mod web;

use crate::config::AppConfig;
use crate::db::PgStore;
use crate::services::auth_service::TokenVerifier;
use crate::state::AppState;

use actix_web::{web as actix_data, App, HttpServer};
use anyhow::Context;
use commerce_core::OrderBook;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()) // Allow RUST_LOG override
    .with_span_events(FmtSpan::CLOSE) // Log when spans close, showing duration
    .init();

  tracing::info!("Starting commerce API server...");

  let app_config = AppConfig::from_env().context("loading configuration")?;

  let db_pool = db::connect(&app_config.database_url, app_config.database_max_connections)
    .await
    .context("connecting to the database")?;

  if app_config.run_migrations {
    db::migrate(&db_pool).await.context("running migrations")?;
  }

  if app_config.seed_db {
    if let Some(password) = &app_config.seed_admin_password {
      db::seed::seed_db(&db_pool, password).await.context("seeding the database")?;
    }
  }

  let store = Arc::new(PgStore::new(db_pool));
  let app_state = AppState {
    order_book: OrderBook::new(store).with_restock_policy(app_config.restock_policy),
  };
  let verifier = actix_data::Data::new(TokenVerifier::new(
    &app_config.jwt_secret,
    &app_config.jwt_issuer,
    &app_config.jwt_audience,
  ));
  tracing::info!(restock_policy = %app_config.restock_policy, "Order book ready.");

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .app_data(verifier.clone())
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(web::configure_app_routes::<PgStore>)
  })
  .bind(&server_address)
  .with_context(|| format!("binding {}", server_address))?
  .run()
  .await?;

  Ok(())
}
