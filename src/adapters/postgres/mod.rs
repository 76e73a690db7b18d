//! `PostgreSQL` adapter for marketplace persistence.

mod models;
mod schema;
mod store;

pub use store::{MarketplacePgPool, PostgresMarketplaceStore};
