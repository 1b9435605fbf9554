// core/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised by the workflow runner itself, independent of any step's logic.
#[derive(Debug, Error)]
pub enum FlowError {
  #[error("Handler missing for required step '{step_name}' in flow '{flow}'")]
  HandlerMissing { flow: String, step_name: String },

  #[error("Flow '{flow}' finished without producing '{missing}'")]
  MissingOutput { flow: String, missing: String },
}

/// Errors surfaced by persistence ports (`CartStore`, `StockLedger`, `OrderStore`).
///
/// `NotFound` is a clean absence and is part of normal control flow
/// (e.g. lazy cart provisioning). `Backend` is anything else.
#[derive(Debug, Error)]
pub enum StoreError {
  #[error("Record not found: {0}")]
  NotFound(String),

  #[error("Conflicting write: {0}")]
  Conflict(String),

  #[error("Store backend failure: {source}")]
  Backend {
    #[source]
    source: AnyhowError,
  },
}

impl StoreError {
  pub fn backend(err: impl Into<AnyhowError>) -> Self {
    StoreError::Backend { source: err.into() }
  }

  pub fn is_not_found(&self) -> bool {
    matches!(self, StoreError::NotFound(_))
  }
}

/// Errors surfaced by the cart cache port. A clean miss is not an error.
#[derive(Debug, Error)]
pub enum CacheError {
  #[error("Cache backend unavailable: {source}")]
  Unavailable {
    #[source]
    source: AnyhowError,
  },
}

impl CacheError {
  pub fn unavailable(err: impl Into<AnyhowError>) -> Self {
    CacheError::Unavailable { source: err.into() }
  }
}

/// Error taxonomy of the cart and checkout services.
#[derive(Debug, Error)]
pub enum CartError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Product {product_id} does not exist")]
  ProductNotFound { product_id: Uuid },

  #[error("Product {product_id} out of stock: requested {requested}, available {available}")]
  OutOfStock {
    product_id: Uuid,
    requested: i32,
    available: i32,
  },

  /// The user's cart was expected to exist but did not. Reported as an
  /// internal inconsistency rather than a client error.
  #[error("Cart does not exist for user {user_id}")]
  CartMissing { user_id: Uuid },

  /// Absence on an administrative lookup, where the caller named the target.
  #[error("Resource Not Found: {0}")]
  NotFound(String),

  /// Stock moved between pricing and the conditional decrement at checkout.
  #[error("Stock changed while placing the order: {0}")]
  StockConflict(String),

  #[error("Forbidden: {0}")]
  Forbidden(String),

  #[error("Corrupted cache entry '{cache_key}': {source}")]
  CacheCorruption {
    cache_key: String,
    #[source]
    source: serde_json::Error,
  },

  /// Never surfaced to callers; reads fall back to the store and writes
  /// treat invalidation as best-effort.
  #[error("Cart cache unavailable: {0}")]
  CacheUnavailable(#[from] CacheError),

  #[error("{context}: {source}")]
  Store {
    context: String,
    #[source]
    source: StoreError,
  },

  #[error("Workflow Error: {0}")]
  Flow(#[from] FlowError),

  #[error("Internal Error: {0}")]
  Internal(String),
}

impl CartError {
  pub(crate) fn store(context: impl Into<String>, source: StoreError) -> Self {
    CartError::Store {
      context: context.into(),
      source,
    }
  }
}

pub type CartResult<T, E = CartError> = std::result::Result<T, E>;
