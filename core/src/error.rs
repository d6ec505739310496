// core/src/error.rs
use anyhow::Error as AnyhowError;
use std::fmt;
use thiserror::Error;

/// The kind of record an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
  User,
  Product,
  Order,
}

impl fmt::Display for Entity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Entity::User => "user",
      Entity::Product => "product",
      Entity::Order => "order",
    })
  }
}

/// Failures surfaced by the order workflow. Every variant is raised only after the
/// in-flight transaction has been rolled back.
#[derive(Debug, Error)]
pub enum OrderError {
  #[error("Invalid argument: {0}")]
  InvalidArgument(String),

  #[error("Referenced {entity} does not exist (missing ids: {missing_ids:?})")]
  ReferentialIntegrity { entity: Entity, missing_ids: Vec<i64> },

  #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
  InsufficientStock {
    product_id: i64,
    available: i32,
    requested: i32,
  },

  #[error("Constraint violation reported by the store: {0}")]
  ConstraintViolation(String),

  #[error("{entity} {id} not found")]
  NotFound { entity: Entity, id: i64 },

  #[error("Persistence failure: {source}")]
  Persistence {
    #[source]
    source: AnyhowError,
  },

  #[error("Internal order workflow error: {0}")]
  Internal(String),
}

impl OrderError {
  /// True when the caller sent something the store cannot honour, as opposed to the
  /// store itself failing.
  pub fn is_client_error(&self) -> bool {
    !matches!(self, OrderError::Persistence { .. } | OrderError::Internal(_))
  }

  pub(crate) fn missing(entity: Entity, missing_ids: Vec<i64>) -> Self {
    OrderError::ReferentialIntegrity { entity, missing_ids }
  }
}

/// Errors a persistence gateway reports. Gateways decide which of their native
/// errors are integrity violations; everything else is a backend failure.
#[derive(Debug, Error)]
pub enum StoreError {
  #[error("Constraint violated: {0}")]
  Constraint(String),

  #[error("Store backend error: {0}")]
  Backend(#[source] AnyhowError),
}

impl StoreError {
  pub fn backend(err: impl Into<AnyhowError>) -> Self {
    StoreError::Backend(err.into())
  }
}

impl From<StoreError> for OrderError {
  fn from(err: StoreError) -> Self {
    match err {
      StoreError::Constraint(detail) => OrderError::ConstraintViolation(detail),
      StoreError::Backend(source) => OrderError::Persistence { source },
    }
  }
}

pub type OrderResult<T, E = OrderError> = std::result::Result<T, E>;
pub type StoreResult<T> = std::result::Result<T, StoreError>;
