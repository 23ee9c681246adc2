//! Client sessions.
//!
//! A [`ClientSession`] binds one [`AccessPolicy`] to one transport. The policy
//! is applied when the transport is built (proxy, TLS trust) and on every
//! fetch (basic-auth challenges). Sessions are cheap to clone and every clone
//! shares the same policy and transport.

mod dispatch;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use url::Url;

use crate::auth::{answer_basic_challenge, ChallengeDisposition};
use crate::config::{AccessPolicy, Credential, SessionOptions, DEFAULT_REQUEST_TIMEOUT};
use crate::error_handling::{InitializationError, WebClientError};
use crate::fetch::{FetchOutcome, ReqwestTransport, SentRequest, Transport, TransportRequest};
use crate::target::RequestTarget;

/// An HTTP session applying an access policy.
///
/// # Examples
///
/// ```no_run
/// use webclients::{AccessPolicy, ClientSession, RequestTarget};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let policy = AccessPolicy::builder()
///     .verify_tls(false)
///     .credential("domotique", "foo", "bar")
///     .build()?;
/// let session = ClientSession::new(policy)?;
///
/// let target = RequestTarget::parse("https://192.168.0.1/index.html", None, None)?;
/// let outcome = session.fetch(&target).await?;
/// println!("{}", outcome.html()?.content);
///
/// // Ten concurrent fetches of the same target
/// session.dispatch(&target, 10).await?;
/// # Ok(())
/// # }
/// ```
pub struct ClientSession<T = ReqwestTransport> {
    policy: Arc<AccessPolicy>,
    transport: Arc<T>,
    options: SessionOptions,
}

impl<T> Clone for ClientSession<T> {
    fn clone(&self) -> Self {
        Self {
            policy: Arc::clone(&self.policy),
            transport: Arc::clone(&self.transport),
            options: self.options.clone(),
        }
    }
}

impl ClientSession<ReqwestTransport> {
    /// Creates a session over a `reqwest` transport with default options.
    ///
    /// # Errors
    ///
    /// `InitializationError` if the TLS configuration or the proxy setup fails.
    pub fn new(policy: impl Into<Arc<AccessPolicy>>) -> Result<Self, InitializationError> {
        Self::with_options(policy, SessionOptions::default())
    }

    /// Creates a session over a `reqwest` transport.
    ///
    /// # Errors
    ///
    /// `InitializationError` if the TLS configuration or the proxy setup fails.
    pub fn with_options(
        policy: impl Into<Arc<AccessPolicy>>,
        options: SessionOptions,
    ) -> Result<Self, InitializationError> {
        let policy = policy.into();
        let transport = ReqwestTransport::new(&policy, &options)?;
        log::info!(
            "Session ready (proxy: {}, verify TLS: {}, {} realm credential(s))",
            policy.proxy().map_or_else(|| "none".to_string(), |p| p.url()),
            policy.verify_tls(),
            policy.credentials().len()
        );
        Ok(Self {
            policy,
            transport: Arc::new(transport),
            options,
        })
    }
}

impl<T: Transport> ClientSession<T> {
    /// Creates a session over any transport, with default options.
    ///
    /// The transport is expected to honor the policy's proxy and TLS settings
    /// itself; the session applies the credential hook.
    pub fn with_transport(policy: impl Into<Arc<AccessPolicy>>, transport: Arc<T>) -> Self {
        Self {
            policy: policy.into(),
            transport,
            options: SessionOptions::default(),
        }
    }

    /// Replaces the session options.
    pub fn with_session_options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    /// The access policy every request of this session follows.
    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    /// The transport requests go through.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetches `target` once.
    ///
    /// Caches are bypassed and the timeout is the target's own, or
    /// [`DEFAULT_REQUEST_TIMEOUT`] when it is zero.
    ///
    /// A `401` carrying a Basic challenge is answered at most once: with the
    /// policy's credential for the realm, or else with the target's own login
    /// and password. The credential is attached to that retry only. When
    /// neither is available the `401` is returned as a normal outcome.
    ///
    /// # Errors
    ///
    /// - `InvalidUrl` if the target does not form a valid URL
    /// - `TransportFailure` if the exchange fails
    /// - `IncompleteFetchResult` if the transport reports success without a
    ///   body or a response
    pub async fn fetch(&self, target: &RequestTarget) -> Result<FetchOutcome, WebClientError> {
        let url = target.url()?;
        let timeout = effective_timeout(target.timeout());

        let outcome = self.exchange(url.clone(), timeout, None).await?;
        let Some(challenge) = outcome.response.basic_challenge() else {
            return Ok(outcome);
        };

        let credential = match answer_basic_challenge(&self.policy, &challenge) {
            ChallengeDisposition::UseCredential(credential) => Some(credential),
            _ => target.credential(),
        };
        match credential {
            Some(credential) => {
                log::debug!(
                    "Retrying {url} with credentials for realm {:?}",
                    challenge.realm
                );
                self.exchange(url, timeout, Some(credential)).await
            }
            None => {
                log::debug!(
                    "No credentials for realm {:?} at {url}, returning the challenge",
                    challenge.realm
                );
                Ok(outcome)
            }
        }
    }

    async fn exchange(
        &self,
        url: Url,
        timeout: Duration,
        credential: Option<Credential>,
    ) -> Result<FetchOutcome, WebClientError> {
        let sent = SentRequest {
            url: url.clone(),
            method: Method::GET,
            timeout,
            bypass_cache: true,
            credentials_attached: credential.is_some(),
        };
        log::debug!("GET {url} (timeout {timeout:?})");

        let reply = self
            .transport
            .execute(TransportRequest {
                url,
                timeout,
                bypass_cache: true,
                credential,
            })
            .await?;
        let outcome = FetchOutcome::from_parts(reply.body, Some(sent), reply.response)?;
        log::debug!(
            "{} answered {} with {} bytes",
            outcome.request.url,
            outcome.status(),
            outcome.body.len()
        );
        Ok(outcome)
    }
}

fn effective_timeout(timeout: Duration) -> Duration {
    if timeout.is_zero() {
        DEFAULT_REQUEST_TIMEOUT
    } else {
        timeout
    }
}
