// server/src/cache/mod.rs

pub mod redis_cache;

pub use redis_cache::RedisCartCache;
