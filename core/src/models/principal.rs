// core/src/models/principal.rs

use crate::error::CartError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  User,
  Admin,
}

/// An authenticated caller, resolved upstream and passed by value into the services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
  pub user_id: Uuid,
  pub role: Role,
}

impl Principal {
  pub fn user(user_id: Uuid) -> Self {
    Self {
      user_id,
      role: Role::User,
    }
  }

  pub fn admin(user_id: Uuid) -> Self {
    Self {
      user_id,
      role: Role::Admin,
    }
  }

  pub fn is_admin(&self) -> bool {
    self.role == Role::Admin
  }

  pub fn require_admin(&self, action: &str) -> Result<(), CartError> {
    if self.is_admin() {
      Ok(())
    } else {
      Err(CartError::Forbidden(format!("Administrator privilege required to {}.", action)))
    }
  }
}
