// server/src/web/handlers/order_handlers.rs

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use crate::web::response::success;

#[instrument(name = "handler::place_order", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn place_order_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let order = app_state.checkout.place_order(auth_user.principal()).await?;
  info!(order_number = %order.order_number, "Order placed from cart.");
  Ok(success(StatusCode::CREATED, "Order placed successfully", order))
}
