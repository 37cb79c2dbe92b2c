//! Unified error types.

use std::fmt;
use std::io;

/// The error type returned by httplog's fallible operations.
///
/// Application-level failures (404, 500, etc.) are written to the
/// [`ResponseSink`](crate::ResponseSink) as ordinary responses, not returned
/// as `Error`s. This type surfaces infrastructure failures and optional
/// capabilities a sink does not have.
#[derive(Debug)]
pub enum Error {
    /// Binding, accepting, or a transport operation failed.
    Io(io::Error),
    /// The sink does not support the named optional capability (e.g. `"push"`).
    ///
    /// Distinct from [`Error::Io`] so callers can tell "not supported here"
    /// apart from "attempted and failed".
    Unimplemented(&'static str),
}

impl Error {
    pub fn is_unimplemented(&self) -> bool {
        matches!(self, Self::Unimplemented(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Unimplemented(what) => write!(f, "unimplemented method: {what}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Unimplemented(_) => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

// ── WriteError ────────────────────────────────────────────────────────────────

/// A failed [`ResponseSink::write`](crate::ResponseSink::write).
///
/// A write can fail halfway: some bytes reach the client, the rest do not.
/// `written` is how many were accepted before the failure, so byte counts
/// stay correct even on the error path.
#[derive(Debug)]
pub struct WriteError {
    written: usize,
    source: io::Error,
}

impl WriteError {
    pub fn new(written: usize, source: io::Error) -> Self {
        Self { written, source }
    }

    /// Bytes accepted by the sink before the failure.
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn kind(&self) -> io::ErrorKind {
        self.source.kind()
    }

    pub fn into_inner(self) -> io::Error {
        self.source
    }
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unable to write: {} (after {} bytes)", self.source, self.written)
    }
}

impl std::error::Error for WriteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

impl From<WriteError> for io::Error {
    fn from(e: WriteError) -> Self {
        io::Error::new(e.kind(), e)
    }
}
