// server/src/cache/redis_cache.rs

use async_trait::async_trait;
use parking_lot::Mutex;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, ErrorKind, RedisError};
use std::time::{Duration, Instant};
use storefront::{CacheError, CartCache};
use tokio::time::timeout;
use tracing::{info, warn};

/// Minimum gap between two connection attempts while Redis is down.
pub const RECONNECT_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Default)]
struct Link {
  connection: Option<ConnectionManager>,
  last_attempt: Option<Instant>,
}

/// Cart cache over a shared Redis `ConnectionManager`.
///
/// The connection is established lazily. Until it is, and whenever a command
/// fails, calls return `CacheError::Unavailable`; a missing key is `Ok(None)`.
pub struct RedisCartCache {
  client: Client,
  connect_timeout: Duration,
  link: Mutex<Link>,
}

impl RedisCartCache {
  /// Opens the client and makes one bounded connection attempt. An
  /// unreachable server is not an error here; only a malformed URL is.
  pub async fn connect(redis_url: &str, connect_timeout: Duration) -> Result<Self, RedisError> {
    let cache = Self {
      client: Client::open(redis_url)?,
      connect_timeout,
      link: Mutex::new(Link::default()),
    };
    match cache.connection().await {
      Ok(_) => info!("Connected to Redis."),
      Err(e) => warn!(error = %e, "Redis unreachable at startup; cart reads will use the store until it recovers."),
    }
    Ok(cache)
  }

  pub fn is_connected(&self) -> bool {
    self.link.lock().connection.is_some()
  }

  async fn connection(&self) -> Result<ConnectionManager, CacheError> {
    {
      let mut link = self.link.lock();
      if let Some(connection) = &link.connection {
        return Ok(connection.clone());
      }
      if link.last_attempt.is_some_and(|at| at.elapsed() < RECONNECT_INTERVAL) {
        return Err(CacheError::unavailable(RedisError::from((
          ErrorKind::IoError,
          "Redis connection not established",
        ))));
      }
      link.last_attempt = Some(Instant::now());
    }

    match timeout(self.connect_timeout, self.client.get_connection_manager()).await {
      Ok(Ok(connection)) => {
        self.link.lock().connection = Some(connection.clone());
        Ok(connection)
      }
      Ok(Err(e)) => Err(CacheError::unavailable(e)),
      Err(elapsed) => {
        warn!(timeout_ms = self.connect_timeout.as_millis() as u64, "Redis connection attempt timed out.");
        Err(CacheError::unavailable(elapsed))
      }
    }
  }
}

#[async_trait]
impl CartCache for RedisCartCache {
  async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
    let mut conn = self.connection().await?;
    conn.get::<_, Option<String>>(key).await.map_err(CacheError::unavailable)
  }

  async fn set(&self, key: &str, payload: &str, ttl: Duration) -> Result<(), CacheError> {
    let mut conn = self.connection().await?;
    // Redis rejects a zero expiry.
    let seconds = ttl.as_secs().max(1);
    conn
      .set_ex::<_, _, ()>(key, payload, seconds)
      .await
      .map_err(CacheError::unavailable)
  }

  async fn delete(&self, key: &str) -> Result<(), CacheError> {
    let mut conn = self.connection().await?;
    conn.del::<_, ()>(key).await.map_err(CacheError::unavailable)
  }
}
