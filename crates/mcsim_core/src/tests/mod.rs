//! Scenario tests for the solver
//!
//! Tests are organized by topic:
//! - `lifecycle` - Construction, batching, resume and stop semantics
//! - `cancellation` - Stopping a solve running on another thread
//! - `failures` - Trial errors raised in the middle of a batch

mod common;

mod cancellation;
