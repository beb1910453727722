//! Utility modules shared across the crate.

pub mod tracing_targets;
