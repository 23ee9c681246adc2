//! Decoding of HTML response bodies into text.

use crate::charset::{resolve_charset, Charset};
use crate::error_handling::WebClientError;
use crate::fetch::ResponseMeta;

const HTML_MIME_TYPE: &str = "text/html";

/// An HTML body converted to text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlDocument {
    /// The decoded document.
    pub content: String,
    /// The charset the body was decoded with.
    pub charset: Charset,
}

impl HtmlDocument {
    /// Decodes `body` using the charset resolved from `response` and the
    /// document itself.
    ///
    /// # Errors
    ///
    /// - `UnsupportedMimeType` when the response is not `text/html`
    /// - `UndecodableContent` when the body is invalid in the resolved charset
    ///
    /// # Examples
    ///
    /// ```
    /// use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
    /// use webclients::{Charset, HtmlDocument, ResponseMeta};
    ///
    /// let mut headers = HeaderMap::new();
    /// headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/html"));
    /// let response = ResponseMeta::new("http://example.com/".parse().unwrap(), 200, headers);
    ///
    /// let document = HtmlDocument::decode(b"<p>caf\xe9</p>", &response).unwrap();
    /// assert_eq!(document.charset, Charset::Latin1);
    /// assert_eq!(document.content, "<p>café</p>");
    /// ```
    pub fn decode(body: &[u8], response: &ResponseMeta) -> Result<Self, WebClientError> {
        if response.mime_type() != Some(HTML_MIME_TYPE) {
            return Err(WebClientError::UnsupportedMimeType {
                mime_type: response.mime_type().map(str::to_string),
            });
        }
        let charset = resolve_charset(body, response);
        log::debug!(
            "Decoding {} bytes from {} as {charset}",
            body.len(),
            response.url()
        );
        let content = charset.decode(body)?;
        Ok(Self { content, charset })
    }
}
