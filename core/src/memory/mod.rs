//! In-process adapters for every port. Backs the `memory` storage backend,
//! the test suites and the benches.

pub mod cache;
pub mod store;

pub use cache::InMemoryCartCache;
pub use store::InMemoryStore;
