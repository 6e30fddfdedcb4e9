//! # Configuration Module
//!
//! Centralizes the crate's tunable constants. Interdependent values are
//! co-located and their relationships enforced through compile-time
//! assertions, so a change to one constant cannot silently invalidate
//! another.
//!
//! - [`constants`]: all numeric configuration values with dependency notes

pub mod constants;
pub use constants::*;
