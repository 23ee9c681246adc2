//! Whole-string matcher for `http[s]://host[:port][/path]`.

/// Components of a URL that matched the grammar, borrowed from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct UrlParts<'a> {
    pub use_tls: bool,
    pub host: &'a str,
    /// Port digits without the `:` separator.
    pub port: Option<&'a str>,
    /// Path including its leading `/`.
    pub path: Option<&'a str>,
}

/// Result of matching an input against the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GrammarMatch<'a> {
    /// The whole input matched.
    Whole(UrlParts<'a>),
    /// The input does not match; the reason is for error messages.
    Rejected(&'static str),
}

/// Matches the whole of `raw` against `protocol://host[:port][/path]`.
///
/// - `protocol` is exactly `http` or `https`
/// - `host` is non-empty and contains neither `:` nor `/`
/// - `port` is one or more ASCII digits
/// - `path` is everything from the first `/` after the authority
pub(crate) fn match_url(raw: &str) -> GrammarMatch<'_> {
    let (use_tls, rest) = if let Some(rest) = raw.strip_prefix("https://") {
        (true, rest)
    } else if let Some(rest) = raw.strip_prefix("http://") {
        (false, rest)
    } else {
        return GrammarMatch::Rejected("expected an http:// or https:// scheme");
    };

    let host_end = rest.find([':', '/']).unwrap_or(rest.len());
    let (host, rest) = rest.split_at(host_end);
    if host.is_empty() {
        return GrammarMatch::Rejected("missing host");
    }

    let (port, rest) = match rest.strip_prefix(':') {
        Some(after_colon) => {
            let digits_end = after_colon
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(after_colon.len());
            if digits_end == 0 {
                return GrammarMatch::Rejected("port must be made of digits");
            }
            let (digits, rest) = after_colon.split_at(digits_end);
            (Some(digits), rest)
        }
        None => (None, rest),
    };

    let path = if rest.is_empty() {
        None
    } else if rest.starts_with('/') {
        Some(rest)
    } else {
        return GrammarMatch::Rejected("unexpected characters after port");
    };

    GrammarMatch::Whole(UrlParts {
        use_tls,
        host,
        port,
        path,
    })
}
