//! Charset resolution from response metadata and document content.

use std::sync::LazyLock;

use regex::Regex;

use super::Charset;
use crate::config::CHARSET_SNIFF_LIMIT;
use crate::fetch::ResponseMeta;

/// Matches the first `charset=<token>` declaration, as found in both
/// `<meta charset="...">` and `<meta http-equiv="Content-Type" content="...; charset=...">`.
static CHARSET_DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)charset\s*=\s*["']?([a-z0-9-]+)"#).expect("charset pattern is valid")
});

/// Determines the charset of an HTML body.
///
/// 1. A charset carried by the response's `Content-Type` header wins when it is
///    in the supported table; the document is not inspected at all, even if a
///    `<meta>` tag disagrees.
/// 2. Otherwise the first [`CHARSET_SNIFF_LIMIT`] bytes are searched for a
///    declaration (see [`sniff_declared_charset`]).
/// 3. Otherwise [`Charset::DEFAULT`] (ISO-8859-1).
pub fn resolve_charset(body: &[u8], response: &ResponseMeta) -> Charset {
    if let Some(charset) = response.text_encoding_name().and_then(Charset::from_label) {
        log::trace!("Using charset {charset} from the Content-Type header");
        return charset;
    }
    sniff_declared_charset(body).unwrap_or(Charset::DEFAULT)
}

/// Looks for an in-document charset declaration.
///
/// The prefix is read as strict 7-bit ASCII so that sniffing cannot fail on
/// its own; a prefix with any 8-bit byte yields `None`. Only the first
/// declaration counts: an unsupported first label yields `None` too.
pub fn sniff_declared_charset(body: &[u8]) -> Option<Charset> {
    let prefix = &body[..body.len().min(CHARSET_SNIFF_LIMIT)];
    if !prefix.is_ascii() {
        log::trace!("Document prefix is not ASCII, skipping charset sniffing");
        return None;
    }
    let head = std::str::from_utf8(prefix).ok()?;
    let captures = CHARSET_DECLARATION.captures(head)?;
    let label = captures.get(1)?.as_str();
    let charset = Charset::from_label(label);
    if charset.is_none() {
        log::debug!("Ignoring unsupported in-document charset '{label}'");
    }
    charset
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};

    fn response(content_type: Option<&str>) -> ResponseMeta {
        let mut headers = HeaderMap::new();
        if let Some(ct) = content_type {
            headers.insert(CONTENT_TYPE, HeaderValue::from_str(ct).unwrap());
        }
        ResponseMeta::new(
            url::Url::parse("http://example.com/").unwrap(),
            200,
            headers,
        )
    }

    #[test]
    fn test_header_takes_precedence_over_meta() {
        let body = br#"<html><head><meta charset="UTF-8"></head></html>"#;
        let charset = resolve_charset(body, &response(Some("text/html; charset=iso-8859-1")));
        assert_eq!(charset, Charset::Latin1);
    }

    #[test]
    fn test_header_charset_is_case_insensitive() {
        let charset = resolve_charset(b"", &response(Some("text/html; charset=UTF-8")));
        assert_eq!(charset, Charset::Utf8);
    }

    #[test]
    fn test_meta_charset_without_header() {
        let body = br#"<!DOCTYPE html><html><head><meta charset="UTF-8"><title>t</title>"#;
        assert_eq!(resolve_charset(body, &response(Some("text/html"))), Charset::Utf8);
    }

    #[test]
    fn test_html4_http_equiv_declaration() {
        let body = br#"<meta http-equiv="Content-Type" content="text/html;charset=ISO-8859-2">"#;
        assert_eq!(resolve_charset(body, &response(None)), Charset::Latin2);
    }

    #[test]
    fn test_unquoted_and_spaced_declarations() {
        assert_eq!(sniff_declared_charset(b"<meta charset=utf-8>"), Some(Charset::Utf8));
        assert_eq!(
            sniff_declared_charset(b"<meta CHARSET = 'windows-1252'>"),
            Some(Charset::Ascii)
        );
    }

    #[test]
    fn test_no_declaration_uses_default() {
        let body = b"<html><body>hello</body></html>";
        assert_eq!(resolve_charset(body, &response(Some("text/html"))), Charset::Latin1);
    }

    #[test]
    fn test_unknown_header_charset_falls_back_to_content() {
        let body = br#"<meta charset="utf-8">"#;
        let charset = resolve_charset(body, &response(Some("text/html; charset=koi8-r")));
        assert_eq!(charset, Charset::Utf8);
    }

    #[test]
    fn test_unknown_declared_charset_uses_default() {
        let body = br#"<meta charset="shift_jis"><meta charset="utf-8">"#;
        // "shift_jis" stops at the underscore, and only the first declaration counts
        assert_eq!(sniff_declared_charset(body), None);
        assert_eq!(resolve_charset(body, &response(None)), Charset::Latin1);
    }

    #[test]
    fn test_declaration_beyond_sniff_limit_is_ignored() {
        let mut body = vec![b' '; CHARSET_SNIFF_LIMIT];
        body.extend_from_slice(br#"<meta charset="utf-8">"#);
        assert_eq!(sniff_declared_charset(&body), None);
    }

    #[test]
    fn test_non_ascii_prefix_skips_sniffing() {
        let body = "<title>café</title><meta charset=\"utf-8\">".as_bytes();
        assert_eq!(sniff_declared_charset(body), None);
        assert_eq!(resolve_charset(body, &response(None)), Charset::Latin1);
    }

    #[test]
    fn test_non_ascii_after_prefix_does_not_matter() {
        let mut body = br#"<meta charset="utf-8">"#.to_vec();
        body.resize(CHARSET_SNIFF_LIMIT, b' ');
        body.extend_from_slice("é".as_bytes());
        assert_eq!(sniff_declared_charset(&body), Some(Charset::Utf8));
    }

    #[test]
    fn test_empty_body() {
        assert_eq!(sniff_declared_charset(b""), None);
        assert_eq!(resolve_charset(b"", &response(None)), Charset::Latin1);
    }
}
