// server/src/errors.rs

use crate::web::response::failure;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use storefront::{CartError, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Forbidden: {0}")]
  Forbidden(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Conflict: {0}")]
  Conflict(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Migration Error: {0}")]
  Migrate(#[from] sqlx::migrate::MigrateError),

  #[error("Cache Error: {0}")]
  Redis(#[from] redis::RedisError),

  #[error(transparent)]
  Cart(#[from] CartError),

  #[error("Store Error: {0}")]
  Store(#[from] StoreError),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl AppError {
  /// Human-readable message for the envelope. Server-side failures get a
  /// generic message; the detail goes in `error`.
  fn public_message(&self) -> String {
    match self.status_code() {
      s if s.is_server_error() => "Something went wrong".to_string(),
      _ => self.to_string(),
    }
  }
}

fn cart_status(err: &CartError) -> StatusCode {
  match err {
    CartError::Validation(_) | CartError::ProductNotFound { .. } | CartError::OutOfStock { .. } => {
      StatusCode::BAD_REQUEST
    }
    CartError::Forbidden(_) => StatusCode::FORBIDDEN,
    CartError::NotFound(_) => StatusCode::NOT_FOUND,
    CartError::StockConflict(_) => StatusCode::CONFLICT,
    CartError::CartMissing { .. }
    | CartError::CacheCorruption { .. }
    | CartError::CacheUnavailable(_)
    | CartError::Store { .. }
    | CartError::Flow(_)
    | CartError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::Forbidden(_) => StatusCode::FORBIDDEN,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Conflict(_) => StatusCode::CONFLICT,
      AppError::Cart(err) => cart_status(err),
      AppError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
      AppError::Store(StoreError::Conflict(_)) => StatusCode::CONFLICT,
      AppError::Config(_)
      | AppError::Sqlx(_)
      | AppError::Migrate(_)
      | AppError::Redis(_)
      | AppError::Store(_)
      | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, status = status.as_u16(), "Responding with error");
    } else {
      tracing::warn!(application_error = %self, status = status.as_u16(), "Responding with error");
    }

    let detail = match self {
      AppError::Cart(CartError::OutOfStock {
        product_id,
        requested,
        available,
      }) => json!({
        "kind": "out_of_stock",
        "product_id": product_id,
        "requested": requested,
        "available": available,
      }),
      other => json!(other.to_string()),
    };
    failure(status, self.public_message(), Some(detail))
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
