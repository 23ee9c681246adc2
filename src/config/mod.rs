//! Library configuration and constants.
//!
//! This module provides:
//! - Configuration constants (ports, timeouts, sniffing limits)
//! - Logging and session option types
//! - The access-network policy

mod constants;
mod policy;
mod types;

// Re-export all constants
pub use constants::*;
pub use policy::{
    AccessPolicy, AccessPolicyBuilder, Credential, CredentialsContainer, ProxySettings,
};
pub use types::{LogFormat, LogLevel, SessionOptions};
