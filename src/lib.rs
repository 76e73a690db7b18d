//! Taskboard: campus task marketplace core.
//!
//! This crate provides the headless core of a campus task marketplace: users
//! post small tasks (notes sharing, errands, event help), other users accept
//! them, and the parties progress each task to completion or cancellation.
//! The crate owns the task lifecycle state machine and its transactional
//! invariants, the per-viewer feed projection, user stat aggregation, and
//! user profile management. UI and authentication are external collaborators.
//!
//! # Architecture
//!
//! Taskboard follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (in-memory, `PostgreSQL`)
//!
//! # Modules
//!
//! - [`domain`]: Task and profile aggregates and the lifecycle state machine
//! - [`ports`]: The document-store abstraction consumed by the services
//! - [`adapters`]: In-memory and Diesel-backed store implementations
//! - [`services`]: Lifecycle orchestration, feed projection, stats, profiles

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
