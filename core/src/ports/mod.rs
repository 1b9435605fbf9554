//! Boundary traits the services consume. Adapters live in `crate::memory`
//! (in-process) and in the server crate (Postgres, Redis).

pub mod cart_cache;
pub mod cart_store;
pub mod order_store;
pub mod stock_ledger;

pub use cart_cache::CartCache;
pub use cart_store::CartStore;
pub use order_store::OrderStore;
pub use stock_ledger::StockLedger;
