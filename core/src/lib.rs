// src/lib.rs

//! Storefront core: the shopping-cart domain of the storefront backend.
//!
//! - Cart provisioning, stock-checked item writes and cache-first reads
//!   (`service::CartService`).
//! - Order placement from a cart (`checkout::CheckoutService`).
//! - Boundary traits for persistence and caching (`ports`), with in-process
//!   adapters (`memory`).
//! - A small named-step runner (`workflow`) the multi-step operations are
//!   written in.

pub mod cache;
pub mod checkout;
pub mod error;
pub mod memory;
pub mod models;
pub mod ports;
pub mod service;
pub mod workflow;

// --- Re-exports for the Public API ---

pub use crate::cache::{cart_cache_key, ItemSource, CART_CACHE_TTL};
pub use crate::checkout::CheckoutService;
pub use crate::error::{CacheError, CartError, CartResult, FlowError, StoreError};
pub use crate::models::{Cart, CartItem, Order, OrderStatus, Principal, Product, Role};
pub use crate::ports::{CartCache, CartStore, OrderStore, StockLedger};
pub use crate::service::{CartCreation, CartItems, CartService, CartSnapshot, ItemWrite};
pub use crate::workflow::{ContextData, Flow, FlowOutcome, StepControl};
