//! Adapter implementations of the store port.

pub mod memory;
pub mod postgres;
