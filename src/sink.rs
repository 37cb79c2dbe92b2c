//! The response-sink abstraction handlers write through.
//!
//! A handler never builds a response value. It is handed a `&mut dyn
//! ResponseSink` and writes the status, headers and body into it, in any
//! order and any number of times. That shape is what lets middleware slip a
//! decorator in between the handler and the real connection.
//!
//! # Capabilities
//!
//! Every sink can write bytes, set the status and expose its headers.
//! Flushing and server push are optional: a sink advertises them by
//! returning `Some` from [`ResponseSink::flusher`] / [`ResponseSink::pusher`].
//!
//! ```text
//! required  write · set_status · headers
//! optional  flusher() -> Option<&mut dyn Flusher>
//!           pusher()  -> Option<&mut dyn Pusher>
//! ```

use http::{HeaderMap, Method, StatusCode};

use crate::error::{Error, WriteError};

/// Where a handler writes its response.
pub trait ResponseSink {
    /// Writes `buf` to the response body and returns how many bytes were taken.
    ///
    /// On failure the returned [`WriteError`] reports how many bytes were
    /// accepted before things went wrong.
    fn write(&mut self, buf: &[u8]) -> Result<usize, WriteError>;

    /// Sets the response status.
    fn set_status(&mut self, status: StatusCode);

    /// The live response headers. Mutations made after the head is committed
    /// are not sent.
    fn headers(&mut self) -> &mut HeaderMap;

    /// Flush capability, if this sink has one.
    fn flusher(&mut self) -> Option<&mut dyn Flusher> {
        None
    }

    /// Server-push capability, if this sink has one.
    fn pusher(&mut self) -> Option<&mut dyn Pusher> {
        None
    }

    /// Writes the whole of `buf`, looping over short writes.
    fn write_all(&mut self, mut buf: &[u8]) -> Result<(), WriteError> {
        while !buf.is_empty() {
            match self.write(buf)? {
                0 => {
                    return Err(WriteError::new(
                        0,
                        std::io::ErrorKind::WriteZero.into(),
                    ));
                }
                n => buf = &buf[n..],
            }
        }
        Ok(())
    }
}

/// Sends buffered body bytes to the client now rather than later.
///
/// Flushing is advisory: it has no error path.
pub trait Flusher {
    fn flush(&mut self);
}

/// HTTP/2 server push.
pub trait Pusher {
    /// Initiates a push of `target` (an absolute path or a URL on the same
    /// authority).
    fn push(&mut self, target: &str, opts: Option<&PushOptions>) -> Result<(), Error>;
}

/// Options for [`Pusher::push`].
#[derive(Clone, Debug)]
pub struct PushOptions {
    /// `GET` or `HEAD`.
    pub method: Method,
    /// Extra request headers for the promised request.
    pub headers: HeaderMap,
}

impl Default for PushOptions {
    fn default() -> Self {
        Self { method: Method::GET, headers: HeaderMap::new() }
    }
}
