//! Fetch results and the transport seam.
//!
//! A completed exchange is a [`FetchOutcome`]: the body, the request as it was
//! sent and the response metadata, always all three. Transports report their
//! completion as optional parts, and [`FetchOutcome::from_parts`] is the only
//! place where a missing part becomes an error.

mod transport;

use std::time::Duration;

use reqwest::header::{HeaderMap, CONTENT_TYPE, WWW_AUTHENTICATE};
use reqwest::Method;
use url::Url;

use crate::auth::{parse_basic_challenge, BasicChallenge};
use crate::error_handling::WebClientError;
use crate::html::HtmlDocument;

pub use transport::{ReqwestTransport, Transport, TransportReply, TransportRequest};

/// Metadata of a received response.
#[derive(Debug, Clone)]
pub struct ResponseMeta {
    url: Url,
    status: u16,
    headers: HeaderMap,
    mime_type: Option<String>,
    text_encoding_name: Option<String>,
}

impl ResponseMeta {
    /// Builds the metadata and extracts the MIME type and charset from
    /// `Content-Type`.
    pub fn new(url: Url, status: u16, headers: HeaderMap) -> Self {
        let (mime_type, text_encoding_name) = headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(parse_content_type)
            .unwrap_or_default();
        Self {
            url,
            status,
            headers,
            mime_type,
            text_encoding_name,
        }
    }

    /// Final URL of the response, after redirects.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Response headers as received.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Lowercased `type/subtype` of `Content-Type`, without parameters.
    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    /// The `charset` parameter of `Content-Type`, as sent by the server.
    pub fn text_encoding_name(&self) -> Option<&str> {
        self.text_encoding_name.as_deref()
    }

    /// The Basic challenge of a `401` response, if it carries one.
    pub fn basic_challenge(&self) -> Option<BasicChallenge> {
        if self.status != 401 {
            return None;
        }
        self.headers
            .get_all(WWW_AUTHENTICATE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(parse_basic_challenge)
    }
}

/// Splits a `Content-Type` value into its lowercased essence and its charset.
fn parse_content_type(value: &str) -> (Option<String>, Option<String>) {
    let mut params = value.split(';');
    let essence = params
        .next()
        .map(|essence| essence.trim().to_ascii_lowercase())
        .filter(|essence| !essence.is_empty());
    let charset = params.find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"').to_string())
            .filter(|value| !value.is_empty())
    });
    (essence, charset)
}

/// The request as it was actually sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentRequest {
    /// Request URL.
    pub url: Url,
    /// HTTP method.
    pub method: Method,
    /// Timeout applied to the exchange.
    pub timeout: Duration,
    /// Whether local and intermediate caches were asked to revalidate.
    pub bypass_cache: bool,
    /// Whether an `Authorization` header was attached.
    pub credentials_attached: bool,
}

/// A completed exchange.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// Raw response body.
    pub body: Vec<u8>,
    /// The request that produced this response.
    pub request: SentRequest,
    /// Response metadata.
    pub response: ResponseMeta,
}

impl FetchOutcome {
    /// Assembles an outcome, requiring every part.
    ///
    /// # Errors
    ///
    /// `IncompleteFetchResult` naming the first absent part.
    pub fn from_parts(
        body: Option<Vec<u8>>,
        request: Option<SentRequest>,
        response: Option<ResponseMeta>,
    ) -> Result<Self, WebClientError> {
        let body = body.ok_or(WebClientError::IncompleteFetchResult { missing: "body" })?;
        let request = request.ok_or(WebClientError::IncompleteFetchResult { missing: "request" })?;
        let response =
            response.ok_or(WebClientError::IncompleteFetchResult { missing: "response" })?;
        Ok(Self {
            body,
            request,
            response,
        })
    }

    /// Status code of the final response.
    pub fn status(&self) -> u16 {
        self.response.status()
    }

    /// Decodes the body as an HTML document.
    ///
    /// # Errors
    ///
    /// See [`HtmlDocument::decode`].
    pub fn html(&self) -> Result<HtmlDocument, WebClientError> {
        HtmlDocument::decode(&self.body, &self.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::ErrorKind;
    use reqwest::header::HeaderValue;

    fn url() -> Url {
        Url::parse("http://example.com/").unwrap()
    }

    fn response(status: u16, headers: &[(&'static str, &'static str)]) -> ResponseMeta {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            map.append(*name, HeaderValue::from_static(*value));
        }
        ResponseMeta::new(url(), status, map)
    }

    fn sent() -> SentRequest {
        SentRequest {
            url: url(),
            method: Method::GET,
            timeout: Duration::from_secs(1),
            bypass_cache: true,
            credentials_attached: false,
        }
    }

    #[test]
    fn test_content_type_parsing() {
        let meta = response(200, &[("content-type", "Text/HTML; Charset=\"ISO-8859-2\"")]);
        assert_eq!(meta.mime_type(), Some("text/html"));
        assert_eq!(meta.text_encoding_name(), Some("ISO-8859-2"));

        let meta = response(200, &[("content-type", "application/json")]);
        assert_eq!(meta.mime_type(), Some("application/json"));
        assert_eq!(meta.text_encoding_name(), None);

        let meta = response(200, &[]);
        assert_eq!(meta.mime_type(), None);
        assert_eq!(meta.text_encoding_name(), None);
    }

    #[test]
    fn test_content_type_with_other_parameters() {
        let meta = response(200, &[("content-type", "text/html; q=1 ; charset=utf-8")]);
        assert_eq!(meta.mime_type(), Some("text/html"));
        assert_eq!(meta.text_encoding_name(), Some("utf-8"));
    }

    #[test]
    fn test_basic_challenge_only_on_401() {
        let headers = [("www-authenticate", "Basic realm=\"domotique\"")];
        let challenge = response(401, &headers).basic_challenge().expect("challenge");
        assert_eq!(challenge.realm.as_deref(), Some("domotique"));
        assert!(response(200, &headers).basic_challenge().is_none());
        assert!(response(401, &[]).basic_challenge().is_none());
    }

    #[test]
    fn test_basic_challenge_among_several_schemes() {
        let meta = response(
            401,
            &[
                ("www-authenticate", "Digest realm=\"other\", nonce=\"abc\""),
                ("www-authenticate", "Basic realm=\"domotique\""),
            ],
        );
        let challenge = meta.basic_challenge().expect("basic challenge");
        assert_eq!(challenge.realm.as_deref(), Some("domotique"));
    }

    #[test]
    fn test_from_parts_requires_every_part() {
        let outcome = FetchOutcome::from_parts(
            Some(b"ok".to_vec()),
            Some(sent()),
            Some(response(200, &[])),
        )
        .expect("complete");
        assert_eq!(outcome.status(), 200);
        assert_eq!(outcome.body, b"ok");

        let cases = [
            (None, Some(sent()), Some(response(200, &[])), "body"),
            (Some(Vec::new()), None, Some(response(200, &[])), "request"),
            (Some(Vec::new()), Some(sent()), None, "response"),
        ];
        for (body, request, meta, missing) in cases {
            let err = FetchOutcome::from_parts(body, request, meta).expect_err("incomplete");
            assert_eq!(err.kind(), ErrorKind::IncompleteFetchResult);
            assert!(err.to_string().contains(missing));
        }
    }

    #[test]
    fn test_empty_body_is_a_body() {
        let outcome =
            FetchOutcome::from_parts(Some(Vec::new()), Some(sent()), Some(response(204, &[])));
        assert!(outcome.is_ok());
    }

    #[test]
    fn test_outcome_html_decoding() {
        let outcome = FetchOutcome::from_parts(
            Some(b"<p>hi</p>".to_vec()),
            Some(sent()),
            Some(response(200, &[("content-type", "text/html; charset=utf-8")])),
        )
        .unwrap();
        let document = outcome.html().expect("html");
        assert_eq!(document.content, "<p>hi</p>");
    }
}
