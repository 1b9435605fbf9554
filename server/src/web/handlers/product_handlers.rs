// server/src/web/handlers/product_handlers.rs

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::response::success;

#[instrument(name = "handler::list_products", skip(app_state))]
pub async fn list_products_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let products = app_state.catalog.list_products().await?;
  info!(count = products.len(), "Products fetched.");
  Ok(success(StatusCode::OK, "Products fetched successfully.", products))
}

#[instrument(name = "handler::get_product", skip(app_state, path), fields(product_id = %*path))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  match app_state.catalog.find_product(product_id).await? {
    Some(product) => Ok(success(StatusCode::OK, "Product fetched successfully.", product)),
    None => {
      warn!("Product not found.");
      Err(AppError::NotFound(format!("Product with ID {} not found.", product_id)))
    }
  }
}
