//! Error type shared by the controller, the samplers and the terminal.
//!
//! Every failure carries a kind that picks the process exit code, a
//! message for the user and, for failures the user can act on, a hint.

use std::error::Error;
use std::fmt;
use std::io;

/// Process exit codes, one per error family.
pub mod exit_codes {
    /// Connection, DNS, TLS or timeout failures.
    pub const NETWORK_ERROR: i32 = 1;
    /// The server directory answered with something unusable.
    pub const API_ERROR: i32 = 2;
    /// Bad command line values.
    pub const CONFIG_ERROR: i32 = 3;
    /// The terminal could not be set up, drawn to or restored.
    pub const TERMINAL_ERROR: i32 = 4;
    pub const UNKNOWN_ERROR: i32 = 99;
}

/// What went wrong, coarsely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Dns,
    Timeout,
    Tls,
    /// Server directory returned an error status or an unusable body
    Api,
    /// Invalid command line value
    Config,
    /// Raw mode, alternate screen, drawing or key input failed
    Terminal,
    Unknown,
}

impl ErrorKind {
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorKind::Network | ErrorKind::Dns | ErrorKind::Timeout | ErrorKind::Tls => {
                exit_codes::NETWORK_ERROR
            }
            ErrorKind::Api => exit_codes::API_ERROR,
            ErrorKind::Config => exit_codes::CONFIG_ERROR,
            ErrorKind::Terminal => exit_codes::TERMINAL_ERROR,
            ErrorKind::Unknown => exit_codes::UNKNOWN_ERROR,
        }
    }

    /// Short label used as the prefix of the displayed error.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorKind::Network => "Network error",
            ErrorKind::Dns => "DNS resolution error",
            ErrorKind::Timeout => "Probe timed out",
            ErrorKind::Tls => "TLS error",
            ErrorKind::Api => "Server directory error",
            ErrorKind::Config => "Invalid option",
            ErrorKind::Terminal => "Terminal error",
            ErrorKind::Unknown => "Unexpected error",
        }
    }

    fn hint(&self) -> Option<&'static str> {
        Some(match self {
            ErrorKind::Network => "Check your internet connection, or use --sampler random.",
            ErrorKind::Dns => "The probe host name did not resolve; check your DNS settings.",
            ErrorKind::Timeout => "The probe host is slow or unreachable; raise --probe-timeout-ms.",
            ErrorKind::Tls => "The probe host's certificate was rejected; check the system clock.",
            ErrorKind::Api => "Point --directory-url at a directory that lists servers.",
            ErrorKind::Config | ErrorKind::Terminal | ErrorKind::Unknown => return None,
        })
    }
}

/// Error returned by every fallible operation in the crate.
#[derive(Debug)]
pub struct SpeedDialError {
    pub kind: ErrorKind,
    /// What failed, for the user
    pub message: String,
    /// What the user can try next
    pub suggestion: Option<String>,
    pub source: Option<Box<dyn Error + Send + Sync>>,
}

impl SpeedDialError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            suggestion: None,
            source: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_source(mut self, source: impl Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn exit_code(&self) -> i32 {
        self.kind.exit_code()
    }

    /// An error of `kind` carrying that kind's standard hint.
    fn hinted(kind: ErrorKind, message: impl Into<String>) -> Self {
        let error = Self::new(kind, message);
        match kind.hint() {
            Some(hint) => error.with_suggestion(hint),
            None => error,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::hinted(ErrorKind::Timeout, message)
    }

    /// The server directory or a probe host answered with something
    /// unusable.
    pub fn api(message: impl Into<String>) -> Self {
        Self::hinted(ErrorKind::Api, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    pub fn terminal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Terminal, message)
    }
}

impl fmt::Display for SpeedDialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.description(), self.message)?;
        match self.suggestion {
            Some(ref suggestion) => write!(f, " ({})", suggestion),
            None => Ok(()),
        }
    }
}

impl Error for SpeedDialError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_deref()
            .map(|source| source as &(dyn Error + 'static))
    }
}

impl From<reqwest::Error> for SpeedDialError {
    fn from(error: reqwest::Error) -> Self {
        let kind = if error.is_timeout() {
            ErrorKind::Timeout
        } else if error.is_status() || error.is_decode() {
            ErrorKind::Api
        } else {
            match classify_error(&error) {
                ErrorKind::Unknown if error.is_connect() => ErrorKind::Network,
                kind => kind,
            }
        };

        let message = match error.url() {
            Some(url) => format!("request to {} failed: {}", url, error),
            None => format!("request failed: {}", error),
        };

        SpeedDialError::hinted(kind, message).with_source(error)
    }
}

impl From<io::Error> for SpeedDialError {
    fn from(error: io::Error) -> Self {
        SpeedDialError::terminal(error.to_string()).with_source(error)
    }
}

impl From<url::ParseError> for SpeedDialError {
    fn from(error: url::ParseError) -> Self {
        SpeedDialError::config(format!("invalid URL: {}", error)).with_source(error)
    }
}

/// Message fragments that identify an error family, checked in order.
const KEYWORDS: &[(ErrorKind, &[&str])] = &[
    (ErrorKind::Dns, &["dns", "resolve", "no such host", "name or service not known"]),
    (ErrorKind::Timeout, &["timed out", "timeout", "deadline"]),
    (ErrorKind::Tls, &["tls", "ssl", "certificate", "handshake"]),
    (
        ErrorKind::Network,
        &[
            "connection refused",
            "connection reset",
            "unreachable",
            "no route",
            "broken pipe",
        ],
    ),
];

/// Work out an error's family from its source chain.
///
/// An `io::Error` anywhere in the chain decides by its `io::ErrorKind`;
/// otherwise the messages of the whole chain are searched for telltale
/// fragments.
pub fn classify_error(error: &(dyn Error + 'static)) -> ErrorKind {
    let mut text = String::new();
    let mut current = Some(error);

    while let Some(e) = current {
        if let Some(io_error) = e.downcast_ref::<io::Error>() {
            match io_error.kind() {
                io::ErrorKind::TimedOut => return ErrorKind::Timeout,
                io::ErrorKind::ConnectionRefused
                | io::ErrorKind::ConnectionReset
                | io::ErrorKind::ConnectionAborted
                | io::ErrorKind::BrokenPipe => return ErrorKind::Network,
                _ => {}
            }
        }
        text.push_str(&e.to_string().to_lowercase());
        text.push('\n');
        current = e.source();
    }

    KEYWORDS
        .iter()
        .find(|(_, needles)| needles.iter().any(|needle| text.contains(needle)))
        .map_or(ErrorKind::Unknown, |(kind, _)| *kind)
}

/// Multi-line rendering printed to stderr before exiting.
pub fn format_error_for_display(error: &SpeedDialError) -> String {
    match error.suggestion {
        Some(ref suggestion) => {
            format!("Error: {}\n\nSuggestion: {}", error.message, suggestion)
        }
        None => format!("Error: {}", error.message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn io_error(kind: io::ErrorKind, message: &str) -> io::Error {
        io::Error::new(kind, message.to_string())
    }

    #[test]
    fn test_network_families_share_exit_code() {
        for kind in [ErrorKind::Network, ErrorKind::Dns, ErrorKind::Timeout, ErrorKind::Tls] {
            assert_eq!(kind.exit_code(), exit_codes::NETWORK_ERROR);
        }
        assert_eq!(ErrorKind::Api.exit_code(), exit_codes::API_ERROR);
        assert_eq!(ErrorKind::Config.exit_code(), exit_codes::CONFIG_ERROR);
        assert_eq!(ErrorKind::Terminal.exit_code(), exit_codes::TERMINAL_ERROR);
        assert_eq!(ErrorKind::Unknown.exit_code(), exit_codes::UNKNOWN_ERROR);
    }

    #[test]
    fn test_probe_failures_carry_hints() {
        let error = SpeedDialError::timeout("no answer from speed.example.net");

        assert_eq!(error.kind, ErrorKind::Timeout);
        assert!(error.suggestion.as_deref().unwrap().contains("--probe-timeout-ms"));
        let display = error.to_string();
        assert!(display.starts_with("Probe timed out: no answer from speed.example.net"));
    }

    #[test]
    fn test_bad_option_has_no_hint() {
        let error = SpeedDialError::config("step must be positive");

        assert!(error.suggestion.is_none());
        assert_eq!(error.to_string(), "Invalid option: step must be positive");
        assert_eq!(error.exit_code(), exit_codes::CONFIG_ERROR);
    }

    #[test]
    fn test_io_kind_decides_before_message() {
        let refused = io_error(io::ErrorKind::ConnectionRefused, "os error 111");
        assert_eq!(classify_error(&refused), ErrorKind::Network);

        let timed_out = io_error(io::ErrorKind::TimedOut, "os error 110");
        assert_eq!(classify_error(&timed_out), ErrorKind::Timeout);
    }

    #[test]
    fn test_message_fragments() {
        let dns = io_error(io::ErrorKind::Other, "failed to lookup address: no such host");
        assert_eq!(classify_error(&dns), ErrorKind::Dns);

        let tls = io_error(io::ErrorKind::Other, "invalid peer certificate: Expired");
        assert_eq!(classify_error(&tls), ErrorKind::Tls);

        let other = io_error(io::ErrorKind::Other, "the dial fell off the wall");
        assert_eq!(classify_error(&other), ErrorKind::Unknown);
    }

    #[test]
    fn test_classify_walks_source_chain() {
        let wrapped = SpeedDialError::new(ErrorKind::Unknown, "probe failed")
            .with_source(io_error(io::ErrorKind::ConnectionReset, "reset by peer"));

        assert_eq!(classify_error(&wrapped), ErrorKind::Network);
        assert!(wrapped.source().is_some());
    }

    #[test]
    fn test_bad_directory_url_is_config() {
        let error: SpeedDialError = url::Url::parse("speedtest dot net").unwrap_err().into();

        assert_eq!(error.kind, ErrorKind::Config);
        assert!(error.message.starts_with("invalid URL"));
    }

    #[test]
    fn test_terminal_io_error() {
        let error: SpeedDialError = io_error(io::ErrorKind::Other, "not a tty").into();

        assert_eq!(error.kind, ErrorKind::Terminal);
        assert_eq!(error.exit_code(), exit_codes::TERMINAL_ERROR);
    }

    #[test]
    fn test_format_error_for_display() {
        let error = SpeedDialError::api("directory returned no servers");
        let output = format_error_for_display(&error);

        assert!(output.starts_with("Error: directory returned no servers\n\nSuggestion: "));

        let plain = format_error_for_display(&SpeedDialError::terminal("raw mode"));
        assert_eq!(plain, "Error: raw mode");
    }
}
