//! Unit tests for the marketplace core.

mod feed_tests;
mod status_transition_tests;
mod support;
