// server/src/db/mod.rs

//! Persistence adapters. `pg` implements the core ports over Postgres;
//! `users` and `catalog` cover the records the core does not own.

pub mod catalog;
pub mod pg;
pub mod seed;
pub mod users;

pub use catalog::ProductCatalog;
pub use pg::PgStore;
pub use users::{InMemoryUserRepository, PgUserRepository, UserRepository};

use storefront::StoreError;

/// Maps a sqlx failure onto the port taxonomy: a missing row is `NotFound`,
/// a unique violation is `Conflict`, anything else is a backend failure.
pub(crate) fn store_error(err: sqlx::Error, what: &str) -> StoreError {
  if matches!(err, sqlx::Error::RowNotFound) {
    return StoreError::NotFound(what.to_string());
  }
  if let sqlx::Error::Database(db_err) = &err {
    if db_err.is_unique_violation() {
      return StoreError::Conflict(format!("{}: {}", what, db_err.message()));
    }
  }
  StoreError::backend(err)
}
