//! Configuration constants.
//!
//! Defaults and limits used by URL parsing, charset sniffing and fetching.

use std::time::Duration;

/// Default port for `http://` targets.
pub const DEFAULT_HTTP_PORT: u16 = 80;
/// Default port for `https://` targets.
pub const DEFAULT_HTTPS_PORT: u16 = 443;

/// Request timeout used when a target's timeout is zero (one hour).
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(3600);

/// Number of leading body bytes inspected for an in-document charset declaration.
pub const CHARSET_SNIFF_LIMIT: usize = 1024;

/// Default User-Agent string for HTTP requests.
pub const DEFAULT_USER_AGENT: &str = concat!("webclients/", env!("CARGO_PKG_VERSION"));
