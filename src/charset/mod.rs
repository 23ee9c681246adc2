//! Charset determination and strict decoding for HTML payloads.
//!
//! Follows the HTML parsing specification's encoding-sniffing heuristic
//! (<https://html.spec.whatwg.org/multipage/parsing.html#determining-the-character-encoding>),
//! restricted to a small table of encodings:
//!
//! | label(s)                                      | decoding        |
//! |-----------------------------------------------|-----------------|
//! | `utf-8`                                       | strict UTF-8    |
//! | `ascii`, `us-ascii`, `ansi`, `windows-1252`   | strict 7-bit    |
//! | `iso-8859-1`                                  | Latin-1         |
//! | `iso-8859-2`                                  | Latin-2         |
//!
//! Decoding never substitutes replacement characters: bytes an encoding cannot
//! represent make the decode fail.

mod sniff;

use strum_macros::EnumIter as EnumIterMacro;

use crate::error_handling::WebClientError;

pub use sniff::{resolve_charset, sniff_declared_charset};

/// A supported text encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum Charset {
    /// UTF-8, rejecting malformed sequences.
    Utf8,
    /// 7-bit ASCII, rejecting any byte above 0x7F.
    Ascii,
    /// ISO-8859-1: every byte maps to the code point of the same value.
    Latin1,
    /// ISO-8859-2.
    Latin2,
}

impl Charset {
    /// HTTP/1.1's historical default, used when nothing else is declared.
    pub const DEFAULT: Charset = Charset::Latin1;

    /// Looks up a charset label, case-insensitively.
    pub fn from_label(label: &str) -> Option<Charset> {
        match label.trim().to_ascii_lowercase().as_str() {
            "utf-8" => Some(Charset::Utf8),
            "ascii" | "us-ascii" | "ansi" | "windows-1252" => Some(Charset::Ascii),
            "iso-8859-1" => Some(Charset::Latin1),
            "iso-8859-2" => Some(Charset::Latin2),
            _ => None,
        }
    }

    /// Canonical name of the charset.
    pub fn as_str(&self) -> &'static str {
        match self {
            Charset::Utf8 => "utf-8",
            Charset::Ascii => "us-ascii",
            Charset::Latin1 => "iso-8859-1",
            Charset::Latin2 => "iso-8859-2",
        }
    }

    /// Decodes `bytes` without any lossy substitution.
    ///
    /// # Errors
    ///
    /// `UndecodableContent` when the bytes are invalid for this charset.
    pub fn decode(&self, bytes: &[u8]) -> Result<String, WebClientError> {
        let decoded = match self {
            Charset::Utf8 => encoding_rs::UTF_8
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|text| text.into_owned()),
            // Windows-1252 pages with bytes above 0x7F are rejected here, not
            // approximated
            Charset::Ascii => bytes
                .is_ascii()
                .then(|| bytes.iter().map(|&b| char::from(b)).collect()),
            Charset::Latin1 => Some(bytes.iter().map(|&b| char::from(b)).collect()),
            Charset::Latin2 => encoding_rs::ISO_8859_2
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|text| text.into_owned()),
        };
        decoded.ok_or(WebClientError::UndecodableContent {
            charset: self.as_str(),
        })
    }
}

impl std::fmt::Display for Charset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
