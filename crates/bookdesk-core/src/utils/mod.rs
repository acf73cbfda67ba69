//! Utility functions for string formatting.

pub mod format;

pub use format::{format_count, format_optional, mask, truncate_string};
