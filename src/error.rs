use std::error;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Error type for the transport.
/// Each variant can store a message for logging purposes.
///
/// Provider-reported failures are *not* represented here: a response body
/// that arrives over a completed round trip is always returned verbatim,
/// whatever the HTTP status, and callers interpret it themselves.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub enum Error {
    UrlParse(String),
    RequestTimeout,
    /// The provider endpoint could not be reached at all.
    Connection(String),
    /// Any other transport-level request failure.
    Request(String),
    /// An attachment could not be written to the staging area.
    /// Raised before any network call is attempted.
    Staging(String),
    /// A raw MIME message could not be parsed.
    MimeParse(String),
    Config(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::UrlParse(ref msg) => f.write_str(&format!("UrlParse: {}", msg)),
            Error::RequestTimeout => f.write_str("RequestTimeout"),
            Error::Connection(ref msg) => f.write_str(&format!("Connection: {}", msg)),
            Error::Request(ref msg) => f.write_str(&format!("Request: {}", msg)),
            Error::Staging(ref msg) => f.write_str(&format!("Staging: {}", msg)),
            Error::MimeParse(ref msg) => f.write_str(&format!("MimeParse: {}", msg)),
            Error::Config(ref msg) => f.write_str(&format!("Config: {}", msg)),
        }
    }
}

impl error::Error for Error {}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::UrlParse(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::RequestTimeout
        } else if err.is_connect() {
            Self::Connection(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Staging(err.to_string())
    }
}

impl From<mailparse::MailParseError> for Error {
    fn from(err: mailparse::MailParseError) -> Self {
        Self::MimeParse(err.to_string())
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
