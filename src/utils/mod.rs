//! Utility functions for output formatting.

pub mod format;

pub use format::{format_optional, format_timestamp, truncate};
