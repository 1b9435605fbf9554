// server/src/web/handlers/user_handlers.rs

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use tracing::instrument;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use crate::web::response::success;

#[instrument(name = "handler::list_users", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn list_users_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  auth_user.require_admin()?;
  let users = app_state.users.list().await?;
  Ok(success(StatusCode::OK, "data fetched successfully", users))
}

/// Callers may read their own record; admins may read any.
#[instrument(name = "handler::get_user", skip(app_state, path, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn get_user_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let target = path.into_inner();
  if target != auth_user.user_id {
    auth_user.require_admin()?;
  }

  match app_state.users.by_id(target).await? {
    Some(user) => Ok(success(StatusCode::OK, "data fetched successfully", user)),
    None => Err(AppError::NotFound(format!("User with ID {} not found.", target))),
  }
}
