// server/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
  /// Postgres for carts, products, users and orders; Redis for the cart cache.
  Postgres,
  /// Everything in process. Used for local runs and the HTTP tests.
  Memory,
}

impl StorageBackend {
  fn parse(value: &str) -> Result<Self> {
    match value.to_ascii_lowercase().as_str() {
      "postgres" => Ok(StorageBackend::Postgres),
      "memory" => Ok(StorageBackend::Memory),
      other => Err(AppError::Config(format!(
        "Invalid STORAGE_BACKEND '{}': expected 'postgres' or 'memory'",
        other
      ))),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Pretty,
  Json,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub storage_backend: StorageBackend,
  /// Required only for the Postgres backend.
  pub database_url: Option<String>,
  pub redis_url: String,
  /// Bound on each Redis connection attempt.
  pub redis_connect_timeout: Duration,
  pub cart_cache_ttl: Duration,
  pub run_migrations: bool,
  pub seed_db: bool,
  pub log_format: LogFormat,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the config from an arbitrary variable source.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let get_or = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());
    let parse_bool = |name: &str, default: &str| {
      get_or(name, default)
        .parse::<bool>()
        .map_err(|e| AppError::Config(format!("Invalid {} value: {}", name, e)))
    };

    let server_host = get_or("SERVER_HOST", "127.0.0.1");
    let server_port = get_or("SERVER_PORT", "8080")
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let storage_backend = StorageBackend::parse(&get_or("STORAGE_BACKEND", "postgres"))?;

    let database_url = lookup("DATABASE_URL");
    if storage_backend == StorageBackend::Postgres && database_url.is_none() {
      return Err(AppError::Config(
        "Missing environment variable 'DATABASE_URL' (required by the postgres backend)".to_string(),
      ));
    }

    let redis_url = get_or("REDIS_URL", "redis://127.0.0.1:6379");
    let redis_connect_timeout_secs = get_or("REDIS_CONNECT_TIMEOUT_SECS", "5")
      .parse::<u64>()
      .map_err(|e| AppError::Config(format!("Invalid REDIS_CONNECT_TIMEOUT_SECS: {}", e)))?;
    if redis_connect_timeout_secs == 0 {
      return Err(AppError::Config("REDIS_CONNECT_TIMEOUT_SECS must be positive".to_string()));
    }
    let cart_cache_ttl_secs = get_or("CART_CACHE_TTL_SECS", "86400")
      .parse::<u64>()
      .map_err(|e| AppError::Config(format!("Invalid CART_CACHE_TTL_SECS: {}", e)))?;
    if cart_cache_ttl_secs == 0 {
      return Err(AppError::Config("CART_CACHE_TTL_SECS must be positive".to_string()));
    }

    let run_migrations = parse_bool("RUN_MIGRATIONS", "false")?;
    let seed_db = parse_bool("SEED_DB", "false")?;
    let log_format = match get_or("LOG_FORMAT", "pretty").to_ascii_lowercase().as_str() {
      "pretty" => LogFormat::Pretty,
      "json" => LogFormat::Json,
      other => return Err(AppError::Config(format!("Invalid LOG_FORMAT '{}'", other))),
    };

    Ok(Self {
      server_host,
      server_port,
      storage_backend,
      database_url,
      redis_url,
      redis_connect_timeout: Duration::from_secs(redis_connect_timeout_secs),
      cart_cache_ttl: Duration::from_secs(cart_cache_ttl_secs),
      run_migrations,
      seed_db,
      log_format,
    })
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig> {
    let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    AppConfig::from_lookup(|name| vars.get(name).cloned())
  }

  #[test]
  fn memory_backend_needs_no_database_url() {
    let cfg = config_from(&[("STORAGE_BACKEND", "memory")]).unwrap();
    assert_eq!(cfg.storage_backend, StorageBackend::Memory);
    assert_eq!(cfg.bind_address(), "127.0.0.1:8080");
    assert_eq!(cfg.cart_cache_ttl, Duration::from_secs(86_400));
    assert_eq!(cfg.log_format, LogFormat::Pretty);
    assert_eq!(cfg.redis_connect_timeout, Duration::from_secs(5));
  }

  #[test]
  fn postgres_backend_requires_database_url() {
    assert!(matches!(config_from(&[]), Err(AppError::Config(_))));
    let cfg = config_from(&[("DATABASE_URL", "postgres://localhost/shop"), ("CART_CACHE_TTL_SECS", "60")]).unwrap();
    assert_eq!(cfg.storage_backend, StorageBackend::Postgres);
    assert_eq!(cfg.cart_cache_ttl, Duration::from_secs(60));
  }

  #[test]
  fn invalid_values_are_config_errors() {
    for vars in [
      vec![("STORAGE_BACKEND", "sqlite")],
      vec![("STORAGE_BACKEND", "memory"), ("SERVER_PORT", "eighty")],
      vec![("STORAGE_BACKEND", "memory"), ("LOG_FORMAT", "xml")],
      vec![("STORAGE_BACKEND", "memory"), ("RUN_MIGRATIONS", "maybe")],
      vec![("STORAGE_BACKEND", "memory"), ("CART_CACHE_TTL_SECS", "0")],
      vec![("STORAGE_BACKEND", "memory"), ("REDIS_CONNECT_TIMEOUT_SECS", "0")],
    ] {
      assert!(matches!(config_from(&vars), Err(AppError::Config(_))), "{:?}", vars);
    }
  }
}
