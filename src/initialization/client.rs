//! HTTP client initialization.
//!
//! Translates an access policy into a `reqwest::Client`: proxy routing and the
//! TLS trust decision are fixed here, once per session.

use std::sync::Arc;

use reqwest::{ClientBuilder, Proxy};

use crate::config::{AccessPolicy, ProxySettings, SessionOptions};
use crate::error_handling::InitializationError;
use crate::tls::build_client_config;

/// Initializes the HTTP client for a session.
///
/// Creates a `reqwest::Client` configured with:
/// - the policy's proxy for both `http` and `https` targets, or no proxy at
///   all (environment proxy variables are ignored)
/// - a `rustls` configuration whose certificate verifier consults the policy
/// - the User-Agent from `options`
///
/// Per-request timeouts are set by the session, not here.
///
/// # Errors
///
/// - `TlsConfigError` if the TLS configuration cannot be built
/// - `HttpClientError` if the proxy URL is rejected or the client fails to build
pub fn init_client(
    policy: &Arc<AccessPolicy>,
    options: &SessionOptions,
) -> Result<reqwest::Client, InitializationError> {
    let tls = build_client_config(Arc::clone(policy))?;
    let builder = ClientBuilder::new()
        .use_preconfigured_tls(tls)
        .user_agent(options.user_agent.clone());

    let builder = match policy.proxy() {
        Some(proxy) => {
            log::debug!("Routing requests through proxy {}", proxy.url());
            let (http, https) = build_proxies(proxy)?;
            builder.proxy(http).proxy(https)
        }
        None => builder.no_proxy(),
    };

    if !policy.verify_tls() {
        log::warn!("TLS certificate verification is disabled for this session");
    }

    Ok(builder.build()?)
}

/// One proxy entry per target scheme, both pointing at the same endpoint.
fn build_proxies(proxy: &ProxySettings) -> Result<(Proxy, Proxy), reqwest::Error> {
    let url = proxy.url();
    let mut http = Proxy::http(&url)?;
    let mut https = Proxy::https(&url)?;
    if let Some(credential) = &proxy.credential {
        http = http.basic_auth(&credential.username, &credential.password);
        https = https.basic_auth(&credential.username, &credential.password);
    }
    Ok((http, https))
}
