//! The control-channel error type.

use derive_more::Display;
use thiserror::Error;

/// The error produced while reading, parsing or handling control-channel
/// traffic. Most kinds map to a reply; I/O errors tear the session down.
#[derive(Debug, Error)]
#[error("control channel error: {kind}")]
pub struct ControlChanError {
    kind: ControlChanErrorKind,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

/// Categories of control-channel failures.
#[derive(Eq, PartialEq, Debug, Display)]
pub enum ControlChanErrorKind {
    /// Failed to perform I/O on the control socket.
    #[display("i/o failure")]
    Io,
    /// A command line held non-UTF-8 bytes.
    #[display("non-UTF8 character in command")]
    Utf8,
    /// The client issued a verb we don't know about.
    #[display("unknown command: {command}")]
    UnknownCommand {
        /// The verb as received (uppercased).
        command: String,
    },
    /// A known verb with an unusable argument.
    #[display("invalid command argument")]
    BadArgument,
    /// Internal invariant broken; closes the session.
    #[display("internal server error")]
    InternalServerError,
}

impl ControlChanError {
    /// Creates a new error of the given kind.
    pub fn new(kind: ControlChanErrorKind) -> Self {
        ControlChanError { kind, source: None }
    }

    /// The category of this error.
    pub fn kind(&self) -> &ControlChanErrorKind {
        &self.kind
    }
}

impl From<ControlChanErrorKind> for ControlChanError {
    fn from(kind: ControlChanErrorKind) -> ControlChanError {
        ControlChanError { kind, source: None }
    }
}

impl From<std::io::Error> for ControlChanError {
    fn from(err: std::io::Error) -> ControlChanError {
        ControlChanError {
            kind: ControlChanErrorKind::Io,
            source: Some(Box::new(err)),
        }
    }
}

impl From<std::str::Utf8Error> for ControlChanError {
    fn from(err: std::str::Utf8Error) -> ControlChanError {
        ControlChanError {
            kind: ControlChanErrorKind::Utf8,
            source: Some(Box::new(err)),
        }
    }
}
