//! TLS client configuration.
//!
//! Server certificates are checked by [`PolicyCertVerifier`], which asks the
//! trust hook first and falls back to WebPKI validation against the Mozilla
//! root set from `webpki-roots`.

use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::client::WebPkiServerVerifier;
use rustls::crypto::{ring, CryptoProvider};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};

use crate::auth::{decide_server_trust, ChallengeDisposition, ServerTrustChallenge};
use crate::config::AccessPolicy;
use crate::error_handling::InitializationError;

/// Certificate verifier that applies the access policy's trust decision.
#[derive(Debug)]
pub struct PolicyCertVerifier {
    policy: Arc<AccessPolicy>,
    inner: Arc<WebPkiServerVerifier>,
}

impl PolicyCertVerifier {
    /// Creates a verifier backed by the `webpki-roots` trust anchors.
    ///
    /// # Errors
    ///
    /// `TlsConfigError` if the WebPKI verifier cannot be built.
    pub fn new(
        policy: Arc<AccessPolicy>,
        provider: Arc<CryptoProvider>,
    ) -> Result<Self, InitializationError> {
        let mut roots = RootCertStore::empty();
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        let inner = WebPkiServerVerifier::builder_with_provider(Arc::new(roots), provider)
            .build()
            .map_err(|e| InitializationError::TlsConfigError(e.to_string()))?;
        Ok(Self { policy, inner })
    }
}

impl ServerCertVerifier for PolicyCertVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        ocsp_response: &[u8],
        now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        let challenge = ServerTrustChallenge {
            host: server_name.to_str().into_owned(),
            chain_len: intermediates.len() + 1,
        };
        match decide_server_trust(&self.policy, &challenge) {
            ChallengeDisposition::AcceptServerTrust => Ok(ServerCertVerified::assertion()),
            _ => self.inner.verify_server_cert(
                end_entity,
                intermediates,
                server_name,
                ocsp_response,
                now,
            ),
        }
    }

    // Handshake signatures are always checked: they bind the session to the
    // presented certificate, trusted or not.
    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        self.inner.verify_tls12_signature(message, cert, dss)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        self.inner.verify_tls13_signature(message, cert, dss)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.inner.supported_verify_schemes()
    }
}

/// Builds the `rustls` client configuration handed to `reqwest`.
///
/// Uses the `ring` provider with its safe default protocol versions and
/// advertises HTTP/1.1 over ALPN.
///
/// # Errors
///
/// `TlsConfigError` when the provider or the verifier cannot be set up.
pub fn build_client_config(policy: Arc<AccessPolicy>) -> Result<ClientConfig, InitializationError> {
    let provider = Arc::new(ring::default_provider());
    let verifier = PolicyCertVerifier::new(policy, Arc::clone(&provider))?;
    let mut config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(verifier))
        .with_no_client_auth();
    config.alpn_protocols = vec![b"http/1.1".to_vec()];
    Ok(config)
}
