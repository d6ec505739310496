// api/src/config.rs

use crate::errors::{AppError, Result};
use commerce_core::RestockPolicy;
use secrecy::SecretString;
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: SecretString,
  pub database_max_connections: u32,

  pub jwt_secret: SecretString,
  pub jwt_issuer: String,
  pub jwt_audience: String,

  pub restock_policy: RestockPolicy,

  pub run_migrations: bool,
  pub seed_db: bool,
  pub seed_admin_password: Option<SecretString>,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenvy::dotenv().ok(); // Load .env file if present
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the config from an arbitrary variable source; `from_env` passes the
  /// process environment.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let get_env = |var_name: &str| {
      lookup(var_name)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::Config(format!("Missing environment variable '{}'", var_name)))
    };
    let parse_flag = |var_name: &str, default: bool| -> Result<bool> {
      match get_env(var_name) {
        Ok(raw) => raw
          .trim()
          .parse::<bool>()
          .map_err(|e| AppError::Config(format!("Invalid {} value: {}", var_name, e))),
        Err(_) => Ok(default),
      }
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|_| "8080".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let database_url = SecretString::from(get_env("DATABASE_URL")?);
    let database_max_connections = get_env("DATABASE_MAX_CONNECTIONS")
      .unwrap_or_else(|_| "10".to_string())
      .parse::<u32>()
      .map_err(|e| AppError::Config(format!("Invalid DATABASE_MAX_CONNECTIONS: {}", e)))?;

    let jwt_secret = SecretString::from(get_env("JWT_SECRET")?);
    let jwt_issuer = get_env("JWT_ISSUER").unwrap_or_else(|_| "commerce-api".to_string());
    let jwt_audience = get_env("JWT_AUDIENCE").unwrap_or_else(|_| "commerce-clients".to_string());

    let restock_policy = match get_env("ORDER_RESTOCK_POLICY") {
      Ok(raw) => raw
        .parse::<RestockPolicy>()
        .map_err(|e| AppError::Config(format!("Invalid ORDER_RESTOCK_POLICY: {}", e)))?,
      Err(_) => RestockPolicy::default(),
    };

    let run_migrations = parse_flag("RUN_MIGRATIONS", true)?;
    let seed_db = parse_flag("SEED_DB", false)?;
    let seed_admin_password = get_env("SEED_ADMIN_PASSWORD").ok().map(SecretString::from);
    if seed_db && seed_admin_password.is_none() {
      return Err(AppError::Config(
        "SEED_ADMIN_PASSWORD is required when SEED_DB=true".to_string(),
      ));
    }

    tracing::info!(
      %server_host,
      server_port,
      database_max_connections,
      %restock_policy,
      run_migrations,
      seed_db,
      "Application configuration loaded successfully."
    );

    Ok(Self {
      server_host,
      server_port,
      database_url,
      database_max_connections,
      jwt_secret,
      jwt_issuer,
      jwt_audience,
      restock_policy,
      run_migrations,
      seed_db,
      seed_admin_password,
    })
  }
}
