// server/src/db/users.rs

use crate::db::store_error;
use crate::models::{NewUser, User};
use async_trait::async_trait;
use parking_lot::RwLock;
use sqlx::PgPool;
use storefront::StoreError;
use uuid::Uuid;

/// Account records. `create` fails with `StoreError::Conflict` when the
/// username or email is taken.
#[async_trait]
pub trait UserRepository: Send + Sync {
  async fn create(&self, new_user: NewUser) -> Result<User, StoreError>;

  async fn by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

  async fn by_id(&self, user_id: Uuid) -> Result<Option<User>, StoreError>;

  async fn list(&self) -> Result<Vec<User>, StoreError>;
}

const USER_COLUMNS: &str = "id, fullname, username, email, password_hash, created_at, updated_at";

#[derive(Clone)]
pub struct PgUserRepository {
  pool: PgPool,
}

impl PgUserRepository {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl UserRepository for PgUserRepository {
  async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
    let user = new_user.into_user();
    sqlx::query(
      "INSERT INTO users (id, fullname, username, email, password_hash, created_at, updated_at) \
       VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(user.id)
    .bind(&user.fullname)
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(&self.pool)
    .await
    .map_err(|e| store_error(e, "username or email already registered"))?;
    Ok(user)
  }

  async fn by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
    sqlx::query_as(&format!(
      "SELECT {} FROM users WHERE email = $1 AND deleted_at IS NULL",
      USER_COLUMNS
    ))
    .bind(email)
    .fetch_optional(&self.pool)
    .await
    .map_err(StoreError::backend)
  }

  async fn by_id(&self, user_id: Uuid) -> Result<Option<User>, StoreError> {
    sqlx::query_as(&format!(
      "SELECT {} FROM users WHERE id = $1 AND deleted_at IS NULL",
      USER_COLUMNS
    ))
    .bind(user_id)
    .fetch_optional(&self.pool)
    .await
    .map_err(StoreError::backend)
  }

  async fn list(&self) -> Result<Vec<User>, StoreError> {
    sqlx::query_as(&format!(
      "SELECT {} FROM users WHERE deleted_at IS NULL ORDER BY created_at ASC",
      USER_COLUMNS
    ))
    .fetch_all(&self.pool)
    .await
    .map_err(StoreError::backend)
  }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
  users: RwLock<Vec<User>>,
}

impl InMemoryUserRepository {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
  async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
    let mut users = self.users.write();
    if users
      .iter()
      .any(|u| u.username == new_user.username || u.email == new_user.email)
    {
      return Err(StoreError::Conflict("username or email already registered".to_string()));
    }
    let user = new_user.into_user();
    users.push(user.clone());
    Ok(user)
  }

  async fn by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
    Ok(self.users.read().iter().find(|u| u.email == email).cloned())
  }

  async fn by_id(&self, user_id: Uuid) -> Result<Option<User>, StoreError> {
    Ok(self.users.read().iter().find(|u| u.id == user_id).cloned())
  }

  async fn list(&self) -> Result<Vec<User>, StoreError> {
    Ok(self.users.read().clone())
  }
}
