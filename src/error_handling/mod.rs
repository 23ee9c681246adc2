//! Error handling and failure statistics.
//!
//! This module provides:
//! - The library error type and its kinds
//! - Transport error categorization
//! - Per-kind failure counters for dispatch summaries

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::categorize_reqwest_error;
pub use stats::FailureStats;
pub use types::{
    BoxError, ErrorKind, InitializationError, TaskFailure, TransportErrorKind, WebClientError,
};
