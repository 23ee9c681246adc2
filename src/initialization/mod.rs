//! Resource setup.
//!
//! This module provides:
//! - HTTP client construction from an access policy (proxy, TLS trust, user agent)
//! - Logger installation for applications and tests
//!
//! All initialization functions return `InitializationError` on failure.

mod client;
mod logger;

// Re-export public API
pub use client::init_client;
pub use logger::init_logger_with;
