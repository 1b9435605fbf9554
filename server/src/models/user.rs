// server/src/models/user.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
  pub id: Uuid,
  pub fullname: String,
  pub username: String,
  pub email: String,
  #[serde(skip_serializing)] // Never send password hash to client
  pub password_hash: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// A validated registration, password already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub fullname: String,
  pub username: String,
  pub email: String,
  pub password_hash: String,
}

impl NewUser {
  pub fn into_user(self) -> User {
    let now = Utc::now();
    User {
      id: Uuid::new_v4(),
      fullname: self.fullname,
      username: self.username,
      email: self.email,
      password_hash: self.password_hash,
      created_at: now,
      updated_at: now,
    }
  }
}
