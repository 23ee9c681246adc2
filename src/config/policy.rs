//! Access-network policy.
//!
//! An `AccessPolicy` bundles everything a session needs to know about the
//! network it runs on: an optional proxy, whether TLS certificates are checked,
//! and the credentials answering basic-auth challenges, keyed by realm.
//! It is immutable once built and shared read-only by every fetch of a session.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;

use crate::error_handling::WebClientError;

/// A username/password pair.
///
/// The `Debug` output never contains the password.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credential {
    /// User name.
    pub username: String,
    /// Password.
    pub password: String,
}

impl Credential {
    /// Creates a credential.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Credentials keyed by authentication realm.
pub type CredentialsContainer = HashMap<String, Credential>;

/// A validated proxy endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxySettings {
    /// Proxy host name or address.
    pub host: String,
    /// Proxy port, never zero.
    pub port: u16,
    /// Whether the connection to the proxy itself uses TLS.
    pub uses_tls: bool,
    /// Optional proxy credentials, sent as proxy basic authentication.
    pub credential: Option<Credential>,
}

impl ProxySettings {
    /// The proxy URL, `http://host:port` or `https://host:port`.
    pub fn url(&self) -> String {
        let scheme = if self.uses_tls { "https" } else { "http" };
        format!("{scheme}://{}:{}", self.host, self.port)
    }
}

/// Immutable network access configuration.
///
/// A proxy is either fully specified or absent: enabling a proxy without a host
/// and port is rejected when the policy is built.
///
/// # Examples
///
/// ```
/// use webclients::AccessPolicy;
///
/// let policy = AccessPolicy::builder()
///     .verify_tls(false)
///     .credential("domotique", "foo", "bar")
///     .build()
///     .unwrap();
/// assert!(!policy.verify_tls());
/// assert!(!policy.use_proxy());
/// assert_eq!(policy.credential_for("domotique").unwrap().username, "foo");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "AccessPolicyBuilder")]
pub struct AccessPolicy {
    proxy: Option<ProxySettings>,
    verify_tls: bool,
    credentials: CredentialsContainer,
}

impl Default for AccessPolicy {
    /// No proxy, certificates verified, no credentials.
    fn default() -> Self {
        Self {
            proxy: None,
            verify_tls: true,
            credentials: CredentialsContainer::new(),
        }
    }
}

impl AccessPolicy {
    /// Starts building a policy from the defaults.
    pub fn builder() -> AccessPolicyBuilder {
        AccessPolicyBuilder::default()
    }

    /// The default policy with certificate verification turned off.
    pub fn insecure() -> Self {
        Self {
            verify_tls: false,
            ..Self::default()
        }
    }

    /// Whether requests go through a proxy.
    pub fn use_proxy(&self) -> bool {
        self.proxy.is_some()
    }

    /// The proxy settings, when a proxy is configured.
    pub fn proxy(&self) -> Option<&ProxySettings> {
        self.proxy.as_ref()
    }

    /// Proxy host, when a proxy is configured.
    pub fn proxy_host(&self) -> Option<&str> {
        self.proxy.as_ref().map(|p| p.host.as_str())
    }

    /// Proxy port, when a proxy is configured.
    pub fn proxy_port(&self) -> Option<u16> {
        self.proxy.as_ref().map(|p| p.port)
    }

    /// Whether the proxy connection uses TLS. `false` without a proxy.
    pub fn proxy_uses_tls(&self) -> bool {
        self.proxy.as_ref().is_some_and(|p| p.uses_tls)
    }

    /// Whether server certificates are validated.
    pub fn verify_tls(&self) -> bool {
        self.verify_tls
    }

    /// All realm credentials.
    pub fn credentials(&self) -> &CredentialsContainer {
        &self.credentials
    }

    /// The credential registered for `realm`.
    pub fn credential_for(&self, realm: &str) -> Option<&Credential> {
        self.credentials.get(realm)
    }
}

/// Builder for [`AccessPolicy`], field-for-field with the policy's flat form.
///
/// Also the deserialization shape of a policy: every field is optional and
/// `verify_tls` defaults to `true`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AccessPolicyBuilder {
    use_proxy: bool,
    proxy_host: Option<String>,
    proxy_port: Option<u16>,
    proxy_uses_tls: bool,
    proxy_login: Option<String>,
    proxy_password: Option<String>,
    verify_tls: bool,
    credentials: CredentialsContainer,
}

impl Default for AccessPolicyBuilder {
    fn default() -> Self {
        Self {
            use_proxy: false,
            proxy_host: None,
            proxy_port: None,
            proxy_uses_tls: false,
            proxy_login: None,
            proxy_password: None,
            verify_tls: true,
            credentials: CredentialsContainer::new(),
        }
    }
}

impl AccessPolicyBuilder {
    /// Enables a proxy at `host:port`.
    pub fn proxy(mut self, host: impl Into<String>, port: u16) -> Self {
        self.use_proxy = true;
        self.proxy_host = Some(host.into());
        self.proxy_port = Some(port);
        self
    }

    /// Turns proxy use on or off without touching host and port.
    pub fn use_proxy(mut self, use_proxy: bool) -> Self {
        self.use_proxy = use_proxy;
        self
    }

    /// Whether the proxy itself is reached over TLS.
    pub fn proxy_uses_tls(mut self, uses_tls: bool) -> Self {
        self.proxy_uses_tls = uses_tls;
        self
    }

    /// Credentials presented to the proxy.
    pub fn proxy_credentials(
        mut self,
        login: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.proxy_login = Some(login.into());
        self.proxy_password = Some(password.into());
        self
    }

    /// Whether server certificates are validated. Defaults to `true`.
    pub fn verify_tls(mut self, verify_tls: bool) -> Self {
        self.verify_tls = verify_tls;
        self
    }

    /// Registers a credential for one realm.
    pub fn credential(
        mut self,
        realm: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials
            .insert(realm.into(), Credential::new(username, password));
        self
    }

    /// Replaces every realm credential.
    pub fn credentials(mut self, credentials: CredentialsContainer) -> Self {
        self.credentials = credentials;
        self
    }

    /// Validates and freezes the policy.
    ///
    /// # Errors
    ///
    /// - `InvalidProxy` when a proxy is enabled without a host or a port
    /// - `InvalidPort` when the proxy port is zero
    pub fn build(self) -> Result<AccessPolicy, WebClientError> {
        let proxy = if self.use_proxy {
            let host = self
                .proxy_host
                .filter(|host| !host.trim().is_empty())
                .ok_or_else(|| WebClientError::InvalidProxy {
                    reason: "proxy enabled without a proxy host".to_string(),
                })?;
            let port = self.proxy_port.ok_or_else(|| WebClientError::InvalidProxy {
                reason: "proxy enabled without a proxy port".to_string(),
            })?;
            if port == 0 {
                return Err(WebClientError::InvalidPort {
                    port: port.to_string(),
                });
            }
            let credential = match (self.proxy_login, self.proxy_password) {
                (None, None) => None,
                (login, password) => Some(Credential::new(
                    login.unwrap_or_default(),
                    password.unwrap_or_default(),
                )),
            };
            Some(ProxySettings {
                host,
                port,
                uses_tls: self.proxy_uses_tls,
                credential,
            })
        } else {
            None
        };

        Ok(AccessPolicy {
            proxy,
            verify_tls: self.verify_tls,
            credentials: self.credentials,
        })
    }
}

impl TryFrom<AccessPolicyBuilder> for AccessPolicy {
    type Error = WebClientError;

    fn try_from(builder: AccessPolicyBuilder) -> Result<Self, Self::Error> {
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_is_secure() {
        let policy = AccessPolicy::default();
        assert!(policy.verify_tls());
        assert!(!policy.use_proxy());
        assert!(policy.proxy_host().is_none());
        assert!(policy.proxy_port().is_none());
        assert!(!policy.proxy_uses_tls());
        assert!(policy.credentials().is_empty());
    }

    #[test]
    fn test_insecure_preset_only_disables_verification() {
        let policy = AccessPolicy::insecure();
        assert!(!policy.verify_tls());
        assert!(!policy.use_proxy());
        assert!(policy.credentials().is_empty());
    }

    #[test]
    fn test_builder_with_proxy() {
        let policy = AccessPolicy::builder()
            .proxy("proxy.local", 3128)
            .proxy_uses_tls(true)
            .proxy_credentials("alice", "secret")
            .build()
            .expect("valid proxy");

        assert!(policy.use_proxy());
        assert_eq!(policy.proxy_host(), Some("proxy.local"));
        assert_eq!(policy.proxy_port(), Some(3128));
        assert!(policy.proxy_uses_tls());
        let proxy = policy.proxy().expect("proxy is set");
        assert_eq!(proxy.url(), "https://proxy.local:3128");
        assert_eq!(
            proxy.credential.as_ref().map(|c| c.username.as_str()),
            Some("alice")
        );
    }

    #[test]
    fn test_use_proxy_without_host_is_rejected() {
        let result = AccessPolicy::builder().use_proxy(true).build();
        assert!(matches!(result, Err(WebClientError::InvalidProxy { .. })));
    }

    #[test]
    fn test_use_proxy_without_port_is_rejected() {
        let mut builder = AccessPolicy::builder().use_proxy(true);
        builder.proxy_host = Some("proxy.local".to_string());
        let result = builder.build();
        assert!(matches!(result, Err(WebClientError::InvalidProxy { .. })));
    }

    #[test]
    fn test_proxy_port_zero_is_rejected() {
        let result = AccessPolicy::builder().proxy("proxy.local", 0).build();
        assert!(matches!(result, Err(WebClientError::InvalidPort { .. })));
    }

    #[test]
    fn test_disabled_proxy_ignores_host() {
        let policy = AccessPolicy::builder()
            .proxy("proxy.local", 8080)
            .use_proxy(false)
            .build()
            .expect("no-proxy policy");
        assert!(!policy.use_proxy());
        assert!(policy.proxy_host().is_none());
    }

    #[test]
    fn test_credential_lookup_by_realm() {
        let policy = AccessPolicy::builder()
            .credential("domotique", "foo", "bar")
            .build()
            .expect("valid policy");
        let credential = policy.credential_for("domotique").expect("mapped realm");
        assert_eq!(credential, &Credential::new("foo", "bar"));
        assert!(policy.credential_for("other").is_none());
    }

    #[test]
    fn test_credential_debug_redacts_password() {
        let credential = Credential::new("foo", "hunter2");
        let debug = format!("{:?}", credential);
        assert!(debug.contains("foo"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_deserialize_policy() {
        let json = r#"{
            "use_proxy": true,
            "proxy_host": "10.0.0.1",
            "proxy_port": 8080,
            "verify_tls": false,
            "credentials": {
                "domotique": { "username": "foo", "password": "bar" }
            }
        }"#;
        let policy: AccessPolicy = serde_json::from_str(json).expect("valid policy");
        assert!(policy.use_proxy());
        assert_eq!(policy.proxy_port(), Some(8080));
        assert!(!policy.proxy_uses_tls());
        assert!(!policy.verify_tls());
        assert_eq!(
            policy.credential_for("domotique"),
            Some(&Credential::new("foo", "bar"))
        );
    }

    #[test]
    fn test_deserialize_empty_policy_uses_defaults() {
        let policy: AccessPolicy = serde_json::from_str("{}").expect("valid policy");
        assert_eq!(policy, AccessPolicy::default());
    }

    #[test]
    fn test_deserialize_rejects_proxy_without_host() {
        let result: Result<AccessPolicy, _> =
            serde_json::from_str(r#"{"use_proxy": true, "proxy_port": 8080}"#);
        let error = result.expect_err("proxy without host must be rejected");
        assert!(error.to_string().contains("proxy host"));
    }
}
