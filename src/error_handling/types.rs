//! Error type definitions.
//!
//! This module defines the error returned by every fallible operation of the
//! library, plus the initialization errors raised while building a session.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Boxed error used as the opaque source of a transport failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client (including proxy setup).
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// Error building the TLS configuration.
    #[error("TLS configuration error: {0}")]
    TlsConfigError(String),
}

impl From<rustls::Error> for InitializationError {
    fn from(e: rustls::Error) -> Self {
        InitializationError::TlsConfigError(e.to_string())
    }
}

/// Transport-level failure categories.
///
/// Mirrors the categories `reqwest` exposes through its `is_*` predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum TransportErrorKind {
    /// The request could not be built.
    Builder,
    /// Redirect loop or redirect policy violation.
    Redirect,
    /// Error status raised by the transport itself.
    Status,
    /// The request did not complete in time.
    Timeout,
    /// Failure while sending the request.
    Request,
    /// The connection could not be established.
    Connect,
    /// Failure while reading the body.
    Body,
    /// The body could not be decoded.
    Decode,
    /// Anything else.
    Other,
}

impl TransportErrorKind {
    /// Returns a human-readable string representation of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportErrorKind::Builder => "request builder error",
            TransportErrorKind::Redirect => "redirect error",
            TransportErrorKind::Status => "status error",
            TransportErrorKind::Timeout => "timeout",
            TransportErrorKind::Request => "request error",
            TransportErrorKind::Connect => "connect error",
            TransportErrorKind::Body => "body error",
            TransportErrorKind::Decode => "decode error",
            TransportErrorKind::Other => "other error",
        }
    }
}

impl std::fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One failed task of a dispatch, tagged with its task index.
#[derive(Debug)]
pub struct TaskFailure {
    /// Zero-based index of the task inside the dispatch.
    pub index: usize,
    /// The error the task finished with.
    pub error: WebClientError,
}

/// Errors produced by URL parsing, charset decoding and fetching.
#[derive(Error, Debug)]
pub enum WebClientError {
    /// The input does not match `http[s]://host[:port][/path]`, or a URL rebuilt
    /// from a target is rejected by the URL parser.
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The offending input.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A port outside 1..=65535.
    #[error("invalid port: {port}")]
    InvalidPort {
        /// The port as written.
        port: String,
    },

    /// A proxy was requested without a host or port.
    #[error("invalid proxy configuration: {reason}")]
    InvalidProxy {
        /// What is missing.
        reason: String,
    },

    /// HTML decoding attempted on a response that is not `text/html`.
    #[error("invalid mime type: {}", .mime_type.as_deref().unwrap_or("<none>"))]
    UnsupportedMimeType {
        /// The MIME type the response declared, if any.
        mime_type: Option<String>,
    },

    /// The body cannot be decoded with the resolved encoding.
    #[error("can not convert data to string with encoding {charset}")]
    UndecodableContent {
        /// Name of the encoding that rejected the bytes.
        charset: &'static str,
    },

    /// Opaque passthrough of the underlying network error.
    #[error("transport failure ({kind}): {source}")]
    TransportFailure {
        /// Category of the failure.
        kind: TransportErrorKind,
        /// The transport's own error.
        #[source]
        source: BoxError,
    },

    /// The transport reported success but one of body, request or response was missing.
    #[error("invalid fetch results: missing {missing}")]
    IncompleteFetchResult {
        /// Which part was absent.
        missing: &'static str,
    },

    /// A dispatched task panicked or was cancelled before producing a result.
    #[error("background task #{index} failed: {reason}")]
    TaskFailed {
        /// Zero-based task index.
        index: usize,
        /// Panic message or cancellation reason.
        reason: String,
    },

    /// Several tasks of one dispatch failed.
    #[error("{} of {total} dispatched fetches failed; first failure (task #{}): {}",
        .failures.len(),
        .failures.first().map(|f| f.index).unwrap_or_default(),
        .failures.first().map(|f| f.error.to_string()).unwrap_or_default())]
    DispatchFailed {
        /// Number of tasks that were launched.
        total: usize,
        /// Every failure, ordered by task index.
        failures: Vec<TaskFailure>,
    },
}

/// Kinds of [`WebClientError`], for counting and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorKind {
    /// See [`WebClientError::InvalidUrl`].
    InvalidUrl,
    /// See [`WebClientError::InvalidPort`].
    InvalidPort,
    /// See [`WebClientError::InvalidProxy`].
    InvalidProxy,
    /// See [`WebClientError::UnsupportedMimeType`].
    UnsupportedMimeType,
    /// See [`WebClientError::UndecodableContent`].
    UndecodableContent,
    /// See [`WebClientError::TransportFailure`].
    TransportFailure,
    /// See [`WebClientError::IncompleteFetchResult`].
    IncompleteFetchResult,
    /// See [`WebClientError::TaskFailed`].
    TaskFailed,
    /// See [`WebClientError::DispatchFailed`].
    DispatchFailed,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorKind {
    /// Returns a human-readable string representation of the error kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidUrl => "Invalid URL",
            ErrorKind::InvalidPort => "Invalid port",
            ErrorKind::InvalidProxy => "Invalid proxy configuration",
            ErrorKind::UnsupportedMimeType => "Unsupported MIME type",
            ErrorKind::UndecodableContent => "Undecodable content",
            ErrorKind::TransportFailure => "Transport failure",
            ErrorKind::IncompleteFetchResult => "Incomplete fetch result",
            ErrorKind::TaskFailed => "Background task failed",
            ErrorKind::DispatchFailed => "Dispatch failed",
        }
    }
}

impl WebClientError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            WebClientError::InvalidUrl { .. } => ErrorKind::InvalidUrl,
            WebClientError::InvalidPort { .. } => ErrorKind::InvalidPort,
            WebClientError::InvalidProxy { .. } => ErrorKind::InvalidProxy,
            WebClientError::UnsupportedMimeType { .. } => ErrorKind::UnsupportedMimeType,
            WebClientError::UndecodableContent { .. } => ErrorKind::UndecodableContent,
            WebClientError::TransportFailure { .. } => ErrorKind::TransportFailure,
            WebClientError::IncompleteFetchResult { .. } => ErrorKind::IncompleteFetchResult,
            WebClientError::TaskFailed { .. } => ErrorKind::TaskFailed,
            WebClientError::DispatchFailed { .. } => ErrorKind::DispatchFailed,
        }
    }

    /// Wraps a transport error that did not come from `reqwest`.
    pub fn transport<E>(kind: TransportErrorKind, error: E) -> Self
    where
        E: Into<BoxError>,
    {
        WebClientError::TransportFailure {
            kind,
            source: error.into(),
        }
    }

    pub(crate) fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        WebClientError::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

impl From<ReqwestError> for WebClientError {
    fn from(e: ReqwestError) -> Self {
        let kind = super::categorization::categorize_reqwest_error(&e);
        WebClientError::TransportFailure {
            kind,
            source: Box::new(e),
        }
    }
}
