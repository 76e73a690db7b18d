//! Port contracts for the marketplace core.
//!
//! Ports define infrastructure-agnostic interfaces used by the services.

pub mod store;

pub use store::{
    MarketplaceStore, ProfileWatch, StoreError, StoreResult, TaskDecision, TaskWatch, TaskWrites,
};
