//! Request targets and URL parsing.
//!
//! A `RequestTarget` is the validated, structured form of a URL a session can
//! fetch: scheme, host, port, path, optional credentials and a timeout.

mod parse;

use std::fmt;
use std::time::Duration;

use url::{Host, Url};

use crate::config::{Credential, DEFAULT_HTTPS_PORT, DEFAULT_HTTP_PORT};
use crate::error_handling::WebClientError;

use parse::{match_url, GrammarMatch};

/// A validated fetch target.
///
/// `requires_auth()` is derived from the presence of a login or a password, so
/// it cannot disagree with them.
#[derive(Clone, PartialEq, Eq)]
pub struct RequestTarget {
    use_tls: bool,
    login: Option<String>,
    password: Option<String>,
    host: String,
    port: u16,
    /// Everything after the leading `/`; `None` when the URL had no path.
    path: Option<String>,
    timeout: Duration,
}

/// Parses `raw` into a [`RequestTarget`].
///
/// Shorthand for [`RequestTarget::parse`].
pub fn parse_url(
    raw: &str,
    login: Option<&str>,
    password: Option<&str>,
) -> Result<RequestTarget, WebClientError> {
    RequestTarget::parse(raw, login, password)
}

impl RequestTarget {
    /// Parses a URL of the form `http[s]://host[:port][/path]`.
    ///
    /// The whole string must match. The port defaults to 443 for `https` and 80
    /// for `http`; the path keeps everything after its leading `/` and defaults
    /// to `/`. `login` and `password` are kept verbatim, and the timeout is zero
    /// (session default) until [`RequestTarget::with_timeout`] sets one.
    ///
    /// # Errors
    ///
    /// - `InvalidUrl` when the input does not match the grammar
    /// - `InvalidPort` when the port is outside 1..=65535
    ///
    /// # Examples
    ///
    /// ```
    /// use webclients::RequestTarget;
    ///
    /// let target = RequestTarget::parse("https://fenyo.net/tmp/index.html", None, None).unwrap();
    /// assert!(target.use_tls());
    /// assert_eq!(target.port(), 443);
    /// assert_eq!(target.path(), "tmp/index.html");
    /// assert!(!target.requires_auth());
    /// ```
    pub fn parse(
        raw: &str,
        login: Option<&str>,
        password: Option<&str>,
    ) -> Result<Self, WebClientError> {
        let parts = match match_url(raw) {
            GrammarMatch::Whole(parts) => parts,
            GrammarMatch::Rejected(reason) => {
                return Err(WebClientError::invalid_url(raw, reason));
            }
        };

        let port = match parts.port {
            Some(digits) => parse_port(digits)?,
            None => default_port(parts.use_tls),
        };

        let path = parts.path.map(|path| path[1..].to_string());

        Ok(Self {
            use_tls: parts.use_tls,
            login: login.map(str::to_string),
            password: password.map(str::to_string),
            host: parts.host.to_string(),
            port,
            path,
            timeout: Duration::ZERO,
        })
    }

    /// Builds a target directly from its components.
    ///
    /// `port` defaults from the scheme. `path` is given the way [`RequestTarget::path`]
    /// returns it, without the leading separator, and defaults to `/`.
    ///
    /// # Errors
    ///
    /// - `InvalidUrl` when `host` is empty or contains `:` or `/`
    /// - `InvalidPort` when `port` is zero
    pub fn new(
        use_tls: bool,
        host: impl Into<String>,
        port: Option<u16>,
        path: Option<&str>,
    ) -> Result<Self, WebClientError> {
        let host = host.into();
        if host.is_empty() || host.contains([':', '/']) {
            return Err(WebClientError::invalid_url(
                host,
                "host must be non-empty and contain neither ':' nor '/'",
            ));
        }
        let port = port.unwrap_or_else(|| default_port(use_tls));
        if port == 0 {
            return Err(WebClientError::InvalidPort {
                port: port.to_string(),
            });
        }
        Ok(Self {
            use_tls,
            login: None,
            password: None,
            host,
            port,
            path: path.map(str::to_string),
            timeout: Duration::ZERO,
        })
    }

    /// Returns the target with these credentials attached.
    pub fn with_credentials(mut self, login: Option<&str>, password: Option<&str>) -> Self {
        self.login = login.map(str::to_string);
        self.password = password.map(str::to_string);
        self
    }

    /// Returns the target with a request timeout; zero means the session default.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `true` for `https`.
    pub fn use_tls(&self) -> bool {
        self.use_tls
    }

    /// `true` when a login or a password was supplied.
    pub fn requires_auth(&self) -> bool {
        self.login.is_some() || self.password.is_some()
    }

    /// Login as given, never synthesized.
    pub fn login(&self) -> Option<&str> {
        self.login.as_deref()
    }

    /// Password as given, never synthesized.
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Host exactly as written in the URL.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Explicit port, or the scheme default.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// The path without its leading separator, or `/` when the URL had none.
    ///
    /// `http://h//` also reports `/`; [`RequestTarget::url`] keeps the two apart.
    pub fn path(&self) -> &str {
        self.path.as_deref().unwrap_or("/")
    }

    /// Request timeout; zero means the session default.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The target's own login/password as a credential, when it has any.
    ///
    /// A missing half is sent as an empty string.
    pub fn credential(&self) -> Option<Credential> {
        self.requires_auth().then(|| {
            Credential::new(
                self.login.clone().unwrap_or_default(),
                self.password.clone().unwrap_or_default(),
            )
        })
    }

    /// Rebuilds the request URL, `http[s]://host:port/path`.
    ///
    /// The result always points at this target's host and port with this path.
    ///
    /// # Errors
    ///
    /// `InvalidUrl` when the assembled string is not a valid URL, or when it
    /// would be read back as a different endpoint or path. The grammar accepts
    /// hosts such as `bad host`, `a.com?b` or `evil.com@good.com` and paths
    /// with `..` segments; none of them survive a rebuild unchanged.
    pub fn url(&self) -> Result<Url, WebClientError> {
        let scheme = if self.use_tls { "https" } else { "http" };
        let path = self.path.as_deref().unwrap_or("");
        let raw = format!("{scheme}://{}:{}/{path}", self.host, self.port);

        let host = Host::parse(&self.host)
            .map_err(|e| WebClientError::invalid_url(raw.as_str(), format!("host: {e}")))?;
        if path_is_rewritten(path) {
            return Err(WebClientError::invalid_url(
                raw,
                "path would be normalized into a different path",
            ));
        }

        let url =
            Url::parse(&raw).map_err(|e| WebClientError::invalid_url(raw.as_str(), e.to_string()))?;
        if url.host_str() != Some(host.to_string().as_str())
            || url.port_or_known_default() != Some(self.port)
            || !url.username().is_empty()
        {
            return Err(WebClientError::invalid_url(
                raw,
                "rebuilt URL points at a different endpoint",
            ));
        }
        Ok(url)
    }
}

impl fmt::Debug for RequestTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestTarget")
            .field("use_tls", &self.use_tls)
            .field("requires_auth", &self.requires_auth())
            .field("login", &self.login)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("path", &self.path)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn default_port(use_tls: bool) -> u16 {
    if use_tls {
        DEFAULT_HTTPS_PORT
    } else {
        DEFAULT_HTTP_PORT
    }
}

/// `true` when URL parsing would alter `path` beyond percent-encoding.
fn path_is_rewritten(path: &str) -> bool {
    let before_query = path.split(['?', '#']).next().unwrap_or(path);
    before_query.contains('\\')
        || path.contains(['\t', '\n', '\r'])
        || path.ends_with(|c: char| c <= ' ')
        || before_query.split('/').any(is_dot_segment)
}

fn is_dot_segment(segment: &str) -> bool {
    let segment = segment.to_ascii_lowercase().replace("%2e", ".");
    segment == "." || segment == ".."
}

fn parse_port(digits: &str) -> Result<u16, WebClientError> {
    // Overlong digit strings overflow u64 and are out of range as well
    let invalid = || WebClientError::InvalidPort {
        port: digits.to_string(),
    };
    let port: u64 = digits.parse().map_err(|_| invalid())?;
    if !(1..=u64::from(u16::MAX)).contains(&port) {
        return Err(invalid());
    }
    u16::try_from(port).map_err(|_| invalid())
}
