// server/src/web/handlers/auth_handlers.rs

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use storefront::StoreError;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::models::NewUser;
use crate::services::auth_service::{hash_password, issue_session_token, verify_password};
use crate::state::AppState;
use crate::web::response::success;

// --- Request DTOs ---
#[derive(Deserialize, Debug)]
pub struct RegisterRequestPayload {
  pub fullname: String,
  pub username: String,
  pub email: String,
  pub password: String,
}

#[derive(Deserialize, Debug)]
pub struct LoginRequestPayload {
  pub email: String,
  pub password: String,
}

fn check_length(field: &str, value: &str, min: usize, max: Option<usize>) -> Result<(), AppError> {
  let len = value.chars().count();
  let too_long = max.is_some_and(|max| len > max);
  if len < min || too_long {
    let bounds = match max {
      Some(max) => format!("between {} and {} characters", min, max),
      None => format!("at least {} characters", min),
    };
    return Err(AppError::Validation(format!("{} must be {}.", field, bounds)));
  }
  Ok(())
}

fn check_email(email: &str) -> Result<(), AppError> {
  match email.split_once('@') {
    Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
    _ => Err(AppError::Validation("email must be a valid email address.".to_string())),
  }
}

impl RegisterRequestPayload {
  fn validate(&self) -> Result<(), AppError> {
    check_length("fullname", self.fullname.trim(), 2, Some(50))?;
    check_length("username", self.username.trim(), 3, Some(50))?;
    check_email(self.email.trim())?;
    check_length("password", &self.password, 6, None)
  }
}

impl LoginRequestPayload {
  fn validate(&self) -> Result<(), AppError> {
    check_email(self.email.trim())?;
    check_length("password", &self.password, 6, None)
  }
}

// --- Handler Implementations ---

#[instrument(name = "handler::register", skip(app_state, req_payload), fields(req_email = %req_payload.email))]
pub async fn register_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<RegisterRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  payload.validate()?;

  let new_user = NewUser {
    fullname: payload.fullname.trim().to_string(),
    username: payload.username.trim().to_string(),
    email: payload.email.trim().to_string(),
    password_hash: hash_password(&payload.password)?,
  };

  let user = match app_state.users.create(new_user).await {
    Ok(user) => user,
    Err(StoreError::Conflict(message)) => {
      warn!(%message, "Registration conflicts with an existing account.");
      return Err(AppError::Conflict("Username or email already registered.".to_string()));
    }
    Err(e) => return Err(e.into()),
  };

  info!(user_id = %user.id, "User registered.");
  Ok(success(StatusCode::OK, "user registered successfully", user))
}

#[instrument(name = "handler::login", skip(app_state, req_payload), fields(req_email = %req_payload.email))]
pub async fn login_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<LoginRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  payload.validate()?;

  let Some(user) = app_state.users.by_email(payload.email.trim()).await? else {
    warn!("Login for unknown email.");
    return Err(AppError::Validation("Invalid credentials.".to_string()));
  };

  if !verify_password(&user.password_hash, &payload.password)? {
    warn!(user_id = %user.id, "Login with wrong password.");
    return Err(AppError::Auth("Invalid credentials.".to_string()));
  }

  let token = issue_session_token(user.id);
  info!(user_id = %user.id, "User logged in.");
  Ok(success(
    StatusCode::OK,
    "logged in successfully",
    json!({ "user": user, "token": token }),
  ))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn payload(fullname: &str, username: &str, email: &str, password: &str) -> RegisterRequestPayload {
    RegisterRequestPayload {
      fullname: fullname.to_string(),
      username: username.to_string(),
      email: email.to_string(),
      password: password.to_string(),
    }
  }

  #[test]
  fn registration_bounds() {
    assert!(payload("Jo", "joe", "j@x.io", "secret").validate().is_ok());
    assert!(payload("J", "joe", "j@x.io", "secret").validate().is_err());
    assert!(payload("Jo", "jo", "j@x.io", "secret").validate().is_err());
    assert!(payload("Jo", "joe", "jx.io", "secret").validate().is_err());
    assert!(payload("Jo", "joe", "j@x.io", "short").validate().is_err());
    assert!(payload(&"a".repeat(51), "joe", "j@x.io", "secret").validate().is_err());
  }
}
