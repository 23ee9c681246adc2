//! Configuration types.
//!
//! Logging options and the per-session options that are not part of the
//! access policy.

use serde::Deserialize;

use crate::config::constants::DEFAULT_USER_AGENT;

/// Verbosity of this crate's log output, as written in a config file.
///
/// Passed to [`init_logger_with`](crate::initialization::init_logger_with),
/// which also accepts a plain `log::LevelFilter`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Silence the crate entirely.
    Off,
    /// Failed fetches and dispatches only.
    Error,
    /// Also disabled TLS verification and per-dispatch failure summaries.
    Warn,
    /// Also session construction and verbose dispatch progress.
    #[default]
    Info,
    /// Also every request and challenge decision.
    Debug,
    /// Also charset resolution steps.
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    #[default]
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Session options that live next to the access policy.
///
/// # Examples
///
/// ```
/// use webclients::config::SessionOptions;
///
/// let options = SessionOptions {
///     verbose: true,
///     ..Default::default()
/// };
/// assert!(options.verbose);
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    /// Log the launch and completion of every dispatched task at `info` level
    /// instead of `debug`.
    pub verbose: bool,

    /// HTTP User-Agent header value
    pub user_agent: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_settings_deserialize_lowercase() {
        let level: LogLevel = serde_json::from_str("\"debug\"").expect("valid level");
        assert_eq!(level, LogLevel::Debug);
        let level: LogLevel = serde_json::from_str("\"off\"").expect("valid level");
        assert_eq!(log::LevelFilter::from(level), log::LevelFilter::Off);
        assert_eq!(LogLevel::default(), LogLevel::Info);
        assert!(serde_json::from_str::<LogLevel>("\"verbose\"").is_err());
        let format: LogFormat = serde_json::from_str("\"json\"").expect("valid format");
        assert_eq!(format, LogFormat::Json);
    }

    #[test]
    fn test_session_options_default() {
        let options = SessionOptions::default();
        assert!(!options.verbose);
        assert_eq!(options.user_agent, DEFAULT_USER_AGENT);
        assert!(options.user_agent.starts_with("webclients/"));
    }

    #[test]
    fn test_session_options_partial_deserialize() {
        let options: SessionOptions =
            serde_json::from_str(r#"{"verbose": true}"#).expect("valid options");
        assert!(options.verbose);
        assert_eq!(options.user_agent, DEFAULT_USER_AGENT);
    }
}
