//! In-memory store adapter for tests and examples.

mod store;

pub use store::InMemoryMarketplaceStore;
