//! webclients: a small HTTP client for fetching and decoding HTML pages
//!
//! This library parses strict `http[s]://host[:port][/path]` URLs into request
//! targets, fetches them through a session that applies an access-network
//! policy (proxy, TLS trust override, per-realm basic-auth credentials), fans
//! out concurrent fetches of the same target, and decodes HTML bodies with the
//! charset announced by the server or declared in the document.
//!
//! # Example
//!
//! ```no_run
//! use webclients::{AccessPolicy, ClientSession, RequestTarget};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let policy = AccessPolicy::builder()
//!     .proxy("proxy.local", 3128)
//!     .credential("domotique", "foo", "bar")
//!     .build()?;
//! let session = ClientSession::new(policy)?;
//!
//! let target = RequestTarget::parse("http://fenyo.net/index.html", None, None)?;
//! let document = session.fetch(&target).await?.html()?;
//! println!("{} ({})", document.content, document.charset);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! Fetching requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or call the session from within an async context.

#![warn(missing_docs)]

mod auth;
mod charset;
pub mod config;
mod error_handling;
mod fetch;
mod html;
pub mod initialization;
mod session;
mod target;
mod tls;

// Re-export public API
pub use auth::{
    answer_basic_challenge, decide_server_trust, handle_challenge, parse_basic_challenge,
    BasicChallenge, Challenge, ChallengeDisposition, ServerTrustChallenge,
};
pub use charset::{resolve_charset, sniff_declared_charset, Charset};
pub use config::{
    AccessPolicy, AccessPolicyBuilder, Credential, CredentialsContainer, ProxySettings,
};
pub use error_handling::{
    categorize_reqwest_error, BoxError, ErrorKind, FailureStats, InitializationError, TaskFailure,
    TransportErrorKind, WebClientError,
};
pub use fetch::{
    FetchOutcome, ReqwestTransport, ResponseMeta, SentRequest, Transport, TransportReply,
    TransportRequest,
};
pub use html::HtmlDocument;
pub use session::ClientSession;
pub use target::{parse_url, RequestTarget};
pub use tls::{build_client_config, PolicyCertVerifier};
