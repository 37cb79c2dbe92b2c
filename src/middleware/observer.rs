//! A [`ResponseSink`] decorator that remembers what went through it.
//!
//! Once a handler has written to the real sink there is no asking it what
//! status it sent or how big the body was. [`ResponseObserver`] sits in
//! between, forwards every call untouched, and keeps those two facts.
//!
//! The observer is total over the sink capabilities: it always answers
//! `flusher()` and `pusher()` with itself, and degrades per call when the
//! wrapped sink lacks the capability.

use http::{HeaderMap, StatusCode};

use crate::error::{Error, WriteError};
use crate::sink::{Flusher, PushOptions, Pusher, ResponseSink};

/// Forwards to an inner sink while tracking status and body size.
///
/// One per request. Never shared, never reused.
pub struct ResponseObserver<'a> {
    inner: &'a mut dyn ResponseSink,
    status: StatusCode,
    size: usize,
}

impl<'a> ResponseObserver<'a> {
    pub fn new(inner: &'a mut dyn ResponseSink) -> Self {
        Self { inner, status: StatusCode::OK, size: 0 }
    }

    /// The last status set, or `200 OK` if none was.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Body bytes written so far, including partial writes that failed.
    pub fn size(&self) -> usize {
        self.size
    }
}

impl ResponseSink for ResponseObserver<'_> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, WriteError> {
        match self.inner.write(buf) {
            Ok(n) => {
                self.size += n;
                Ok(n)
            }
            Err(e) => {
                self.size += e.written();
                Err(e)
            }
        }
    }

    fn set_status(&mut self, status: StatusCode) {
        self.inner.set_status(status);
        self.status = status;
    }

    fn headers(&mut self) -> &mut HeaderMap {
        self.inner.headers()
    }

    fn flusher(&mut self) -> Option<&mut dyn Flusher> {
        Some(self)
    }

    fn pusher(&mut self) -> Option<&mut dyn Pusher> {
        Some(self)
    }
}

impl Flusher for ResponseObserver<'_> {
    fn flush(&mut self) {
        if let Some(flusher) = self.inner.flusher() {
            flusher.flush();
        }
    }
}

impl Pusher for ResponseObserver<'_> {
    fn push(&mut self, target: &str, opts: Option<&PushOptions>) -> Result<(), Error> {
        match self.inner.pusher() {
            Some(pusher) => pusher.push(target, opts),
            None => Err(Error::Unimplemented("push")),
        }
    }
}
