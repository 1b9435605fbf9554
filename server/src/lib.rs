// server/src/lib.rs

//! HTTP front end of the storefront: actix-web routing, Postgres and Redis
//! adapters for the `storefront` core, accounts and configuration.

pub mod cache;
pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod services;
pub mod state;
pub mod telemetry;
pub mod web;
