// server/src/web/routes.rs

use actix_web::error::{JsonPayloadError, PathError};
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::errors::AppError;
use crate::web::handlers::{auth_handlers, cart_handlers, order_handlers, product_handlers, user_handlers};
use crate::web::response::success;

async fn health_check_handler() -> HttpResponse {
  success(StatusCode::OK, "ok", json!({ "status": "ok" }))
}

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
  AppError::Validation(format!("Invalid request body: {}", err)).into()
}

fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
  AppError::Validation(format!("Invalid path parameter: {}", err)).into()
}

/// Mounts every route under `/api/v1` and makes body/path binding failures
/// answer with the standard failure envelope.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .app_data(web::JsonConfig::default().error_handler(json_error_handler))
    .app_data(web::PathConfig::default().error_handler(path_error_handler))
    .service(
      web::scope("/api/v1")
        .route("/health", web::get().to(health_check_handler))
        .service(
          web::scope("/users")
            .route("/register", web::post().to(auth_handlers::register_handler))
            .route("/login", web::post().to(auth_handlers::login_handler))
            .route("", web::get().to(user_handlers::list_users_handler))
            .route("/{id}", web::get().to(user_handlers::get_user_handler)),
        )
        .service(
          web::scope("/products")
            .route("", web::get().to(product_handlers::list_products_handler))
            .route("/{product_id}", web::get().to(product_handlers::get_product_handler)),
        )
        // Literal segments first: "/items" must not be captured by "/{user_id}".
        .service(
          web::scope("/cart")
            .route("", web::post().to(cart_handlers::create_cart_handler))
            .route("/item", web::post().to(cart_handlers::add_item_handler))
            .route("/items", web::get().to(cart_handlers::list_items_handler))
            .route("/item/{product_id}", web::delete().to(cart_handlers::remove_item_handler))
            .route("/{user_id}", web::get().to(cart_handlers::admin_get_cart_handler))
            .route("/{user_id}", web::delete().to(cart_handlers::admin_delete_cart_handler)),
        )
        .service(web::scope("/orders").route("", web::post().to(order_handlers::place_order_handler))),
    );
}
