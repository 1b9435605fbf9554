// server/src/models/mod.rs

//! Records owned by the server alone. Cart, product and order types come
//! from the `storefront` core.

pub mod user;

pub use user::{NewUser, User};
