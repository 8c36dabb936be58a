//! Utility modules shared across the crate.

/// Error types and the crate-wide result alias.
pub mod error;
