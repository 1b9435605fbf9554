// server/src/web/handlers/cart_handlers.rs

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use storefront::{CartCreation, ItemWrite};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use crate::web::response::success;

// --- Request DTO ---
#[derive(Deserialize, Debug)]
pub struct AddItemRequestPayload {
  pub product_id: Uuid,
  pub quantity: i32,
}

// --- Handler Implementations ---

#[instrument(name = "handler::create_cart", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn create_cart_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let outcome = app_state.carts.create_cart(auth_user.principal()).await?;
  Ok(match outcome {
    CartCreation::Created(cart) => success(StatusCode::CREATED, "Cart created successfully", cart),
    CartCreation::AlreadyExisted(cart) => success(StatusCode::OK, "Cart already exists", cart),
  })
}

#[instrument(
  name = "handler::add_cart_item",
  skip(app_state, req_payload, auth_user),
  fields(user_id = %auth_user.user_id, product_id = %req_payload.product_id, quantity = req_payload.quantity)
)]
pub async fn add_item_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<AddItemRequestPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let written = app_state
    .carts
    .add_or_update_item(auth_user.principal(), req_payload.product_id, req_payload.quantity)
    .await?;

  let message = match &written {
    ItemWrite::Created { .. } => "Item added to cart successfully",
    ItemWrite::Updated { .. } => "Cart item quantity updated successfully",
  };
  info!(item_id = %written.item().id, quantity = written.item().quantity, "{}", message);
  Ok(success(StatusCode::OK, message, written))
}

#[instrument(name = "handler::list_cart_items", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn list_items_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let listed = app_state.carts.list_items(auth_user.principal()).await?;
  Ok(success(StatusCode::OK, listed.source.message(), listed))
}

#[instrument(name = "handler::remove_cart_item", skip(app_state, path, auth_user), fields(user_id = %auth_user.user_id, product_id = %*path))]
pub async fn remove_item_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  app_state.carts.remove_item(auth_user.principal(), product_id).await?;
  Ok(success(
    StatusCode::OK,
    "Item removed from cart",
    serde_json::json!({ "product_id": product_id }),
  ))
}

#[instrument(name = "handler::admin_get_cart", skip(app_state, path, auth_user), fields(admin_id = %auth_user.user_id, target_user = %*path))]
pub async fn admin_get_cart_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let snapshot = app_state
    .carts
    .cart_for_user(auth_user.principal(), path.into_inner())
    .await?;
  Ok(success(StatusCode::OK, "Cart fetched successfully", snapshot))
}

#[instrument(name = "handler::admin_delete_cart", skip(app_state, path, auth_user), fields(admin_id = %auth_user.user_id, target_user = %*path))]
pub async fn admin_delete_cart_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let target = path.into_inner();
  app_state.carts.delete_cart_for_user(auth_user.principal(), target).await?;
  Ok(success(
    StatusCode::OK,
    "Cart deleted successfully",
    serde_json::json!({ "user_id": target }),
  ))
}
