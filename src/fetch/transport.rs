//! The transport seam between a session and the network.

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use url::Url;

use super::ResponseMeta;
use crate::config::{AccessPolicy, Credential, SessionOptions};
use crate::error_handling::{InitializationError, WebClientError};

/// One GET exchange to perform.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// Absolute URL to GET.
    pub url: Url,
    /// Deadline for the whole exchange, body included.
    pub timeout: Duration,
    /// Ask every cache on the way to revalidate (`Cache-Control: no-cache`).
    pub bypass_cache: bool,
    /// Sent as `Authorization: Basic ...` when present.
    pub credential: Option<Credential>,
}

/// What a transport observed. A successful exchange fills both parts.
#[derive(Debug, Clone, Default)]
pub struct TransportReply {
    /// Status line and headers, once received.
    pub response: Option<ResponseMeta>,
    /// The full body, once read.
    pub body: Option<Vec<u8>>,
}

/// Performs HTTP exchanges on behalf of a session.
///
/// Implementations must be cancel-safe: dropping the returned future abandons
/// the exchange.
pub trait Transport: Send + Sync + 'static {
    /// Performs one exchange and reports what came back.
    fn execute(
        &self,
        request: TransportRequest,
    ) -> BoxFuture<'_, Result<TransportReply, WebClientError>>;
}

/// `reqwest`-backed transport configured from an [`AccessPolicy`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Builds the underlying client: proxy, TLS verification and user agent
    /// come from `policy` and `options`.
    ///
    /// # Errors
    ///
    /// See [`crate::initialization::init_client`].
    pub fn new(
        policy: &Arc<AccessPolicy>,
        options: &SessionOptions,
    ) -> Result<Self, InitializationError> {
        let client = crate::initialization::init_client(policy, options)?;
        Ok(Self { client })
    }

    /// Wraps an already configured client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    fn execute(
        &self,
        request: TransportRequest,
    ) -> BoxFuture<'_, Result<TransportReply, WebClientError>> {
        async move {
            let mut builder = self
                .client
                .get(request.url)
                .timeout(request.timeout);
            if request.bypass_cache {
                builder = builder
                    .header(CACHE_CONTROL, "no-cache")
                    .header(PRAGMA, "no-cache");
            }
            if let Some(credential) = &request.credential {
                builder = builder.basic_auth(&credential.username, Some(&credential.password));
            }

            let response = builder.send().await?;
            let meta = ResponseMeta::new(
                response.url().clone(),
                response.status().as_u16(),
                response.headers().clone(),
            );
            let body = response.bytes().await?;
            Ok(TransportReply {
                response: Some(meta),
                body: Some(body.to_vec()),
            })
        }
        .boxed()
    }
}
