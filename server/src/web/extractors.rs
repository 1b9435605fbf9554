// server/src/web/extractors.rs

use crate::errors::AppError;
use actix_web::{dev::Payload, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use storefront::{Principal, Role};
use tracing::warn;
use uuid::Uuid;

pub const USER_ID_HEADER: &str = "X-User-ID";
pub const USER_ROLE_HEADER: &str = "X-User-Role";

/// The caller identity resolved by the upstream authentication layer and
/// forwarded in `X-User-ID` / `X-User-Role`.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
  pub user_id: Uuid,
  pub role: Role,
}

impl AuthenticatedUser {
  pub fn principal(&self) -> Principal {
    Principal {
      user_id: self.user_id,
      role: self.role,
    }
  }

  pub fn require_admin(&self) -> Result<(), AppError> {
    match self.role {
      Role::Admin => Ok(()),
      Role::User => Err(AppError::Forbidden("Administrator privilege required.".to_string())),
    }
  }
}

fn parse_identity(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
  let user_id = req
    .headers()
    .get(USER_ID_HEADER)
    .and_then(|value| value.to_str().ok())
    .and_then(|value| Uuid::parse_str(value.trim()).ok())
    .ok_or_else(|| AppError::Auth("Missing or invalid X-User-ID header.".to_string()))?;

  let role = match req.headers().get(USER_ROLE_HEADER).map(|value| value.to_str()) {
    None => Role::User,
    Some(Ok(value)) if value.eq_ignore_ascii_case("admin") => Role::Admin,
    Some(Ok(value)) if value.eq_ignore_ascii_case("user") => Role::User,
    Some(_) => return Err(AppError::Auth("Invalid X-User-Role header.".to_string())),
  };

  Ok(AuthenticatedUser { user_id, role })
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let result = parse_identity(req);
    if let Err(e) = &result {
      warn!(path = %req.path(), error = %e, "Rejecting unauthenticated request.");
    }
    ready(result)
  }
}
