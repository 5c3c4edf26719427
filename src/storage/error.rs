use derive_more::Display;
use thiserror::Error;

/// The error returned by the filesystem adapter. The `ErrorKind` determines
/// which FTP reply the session sends for a failed file operation.
#[derive(Debug, Error)]
#[error("filesystem error: {kind}")]
pub struct Error {
    kind: ErrorKind,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Creates a new filesystem error wrapping a source error.
    pub fn new<E>(kind: ErrorKind, source: E) -> Error
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Error {
            kind,
            source: Some(source.into()),
        }
    }

    /// The category of the failure.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error { kind, source: None }
    }
}

/// The failure categories produced by the filesystem adapter.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Display)]
pub enum ErrorKind {
    /// The path does not exist.
    #[display("no such file or directory")]
    NotFound,
    /// The path already exists.
    #[display("file exists")]
    Exists,
    /// The operating system denied access.
    #[display("permission denied")]
    PermissionDenied,
    /// A directory was required but the path names something else.
    #[display("not a directory")]
    NotADirectory,
    /// A file was required but the path names a directory.
    #[display("is a directory")]
    IsADirectory,
    /// The directory could not be removed because it has entries.
    #[display("directory not empty")]
    DirectoryNotEmpty,
    /// Any other I/O failure.
    #[display("i/o error")]
    Io,
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound,
            std::io::ErrorKind::AlreadyExists => ErrorKind::Exists,
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied,
            std::io::ErrorKind::NotADirectory => ErrorKind::NotADirectory,
            std::io::ErrorKind::IsADirectory => ErrorKind::IsADirectory,
            std::io::ErrorKind::DirectoryNotEmpty => ErrorKind::DirectoryNotEmpty,
            _ => ErrorKind::Io,
        };
        Error::new(kind, err)
    }
}
