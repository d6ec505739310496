// api/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use commerce_core::OrderError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Migration Error: {0}")]
  Migrate(#[from] sqlx::migrate::MigrateError),

  #[error(transparent)]
  Order(#[from] OrderError),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::Order(err) => match err {
        OrderError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        OrderError::ReferentialIntegrity { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        OrderError::InsufficientStock { .. } | OrderError::ConstraintViolation(_) => StatusCode::CONFLICT,
        OrderError::NotFound { .. } => StatusCode::NOT_FOUND,
        OrderError::Persistence { .. } | OrderError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
      },
      AppError::Config(_) | AppError::Sqlx(_) | AppError::Migrate(_) | AppError::Internal(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with error");
    } else {
      tracing::warn!(application_error = %self, status = status.as_u16(), "Request rejected");
    }

    let body = match self {
      AppError::Validation(m) | AppError::Auth(m) => json!({"error": m}),
      AppError::Config(_) => json!({"error": "Configuration issue"}),
      AppError::Sqlx(_) | AppError::Migrate(_) => json!({"error": "Database operation failed"}),
      AppError::Internal(_) => json!({"error": "An internal error occurred"}),
      AppError::Order(err) => match err {
        OrderError::ReferentialIntegrity { entity, missing_ids } => json!({
          "error": err.to_string(),
          "entity": entity.to_string(),
          "missingIds": missing_ids,
        }),
        OrderError::InsufficientStock {
          product_id,
          available,
          requested,
        } => json!({
          "error": err.to_string(),
          "productId": product_id,
          "available": available,
          "requested": requested,
        }),
        // Store internals stay in the log.
        OrderError::Persistence { .. } | OrderError::Internal(_) => {
          json!({"error": "Order could not be persisted"})
        }
        other => json!({"error": other.to_string()}),
      },
    };
    HttpResponse::build(status).json(body)
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
