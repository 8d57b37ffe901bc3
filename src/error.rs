//! Error taxonomy for the TogoMQ client.
//!
//! Every failure carries a stable [`ErrorKind`] tag, a human-readable
//! message, and (when it came from somewhere else) the original cause.
//! Callers branch on [`Error::kind`] instead of parsing message text.

use std::error::Error as StdError;
use std::fmt;

use tonic::Status;

pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The fixed set of error kinds surfaced by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The underlying channel could not be established.
    Connection,
    /// The credential was rejected or could not be attached to a call.
    Auth,
    /// Malformed local input, caught before any network call.
    Validation,
    /// Failure during or after the publish call.
    Publish,
    /// Failure opening or reading a subscription stream.
    Subscribe,
    /// Uncategorized failure while consuming a stream.
    Stream,
    /// Invalid configuration value.
    Configuration,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 7] = [
        ErrorKind::Connection,
        ErrorKind::Auth,
        ErrorKind::Validation,
        ErrorKind::Publish,
        ErrorKind::Subscribe,
        ErrorKind::Stream,
        ErrorKind::Configuration,
    ];

    /// Stable tag for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Connection => "CONNECTION",
            ErrorKind::Auth => "AUTH",
            ErrorKind::Validation => "VALIDATION",
            ErrorKind::Publish => "PUBLISH",
            ErrorKind::Subscribe => "SUBSCRIBE",
            ErrorKind::Stream => "STREAM",
            ErrorKind::Configuration => "CONFIGURATION",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A client error: kind tag, message, optional wrapped cause.
#[derive(Debug, thiserror::Error)]
#[error("[{kind}] {message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Connection, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Auth, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn publish(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Publish, message)
    }

    pub fn subscribe(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Subscribe, message)
    }

    pub fn stream(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Stream, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Attach the original cause.
    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    /// The gRPC status this error wraps, if the cause was one.
    pub fn status(&self) -> Option<&Status> {
        self.source.as_ref()?.downcast_ref::<Status>()
    }

    /// Map a failed publish call.
    ///
    /// A status produced by the server keeps its detail string; a status
    /// synthesized from a lower-level transport error is reported with
    /// that error's text.
    pub(crate) fn from_publish_status(status: Status) -> Self {
        let message = if status.source().is_some() {
            format!("Error publishing messages: {}", status)
        } else {
            format!("Failed to publish messages: {}", status.message())
        };
        Self::publish(message).with_source(status)
    }

    /// Map a failure opening or reading a subscription stream.
    ///
    /// Detail is chosen the same way as for publish; a server status with
    /// no message falls back to its code description.
    pub(crate) fn from_subscribe_status(status: Status) -> Self {
        let detail = if status.source().is_some() {
            status.to_string()
        } else if status.message().is_empty() {
            status.code().description().to_string()
        } else {
            status.message().to_string()
        };
        Self::subscribe(format!("Error in subscription: {}", detail)).with_source(status)
    }
}

impl From<Status> for Error {
    fn from(status: Status) -> Self {
        Self::stream(format!("stream failed: {}", status.message())).with_source(status)
    }
}

impl From<::config::ConfigError> for Error {
    fn from(err: ::config::ConfigError) -> Self {
        Self::configuration(format!("Invalid configuration: {}", err)).with_source(err)
    }
}
