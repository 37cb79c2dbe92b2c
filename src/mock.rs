//! Test double for [`ResponseSink`].

use std::io;

use http::{HeaderMap, StatusCode};

use crate::error::{Error, WriteError};
use crate::sink::{Flusher, PushOptions, Pusher, ResponseSink};

/// Scripted sink: records everything, fails or short-writes on request,
/// and only advertises flush / push when told to.
#[derive(Default)]
pub(crate) struct MockSink {
    pub body: Vec<u8>,
    pub statuses: Vec<StatusCode>,
    pub headers: HeaderMap,
    pub flushes: usize,
    pub can_flush: bool,
    pub can_push: bool,
    pub pushed: Vec<(String, Option<PushOptions>)>,
    pub push_fails: bool,
    /// Accept at most this many more bytes, then fail.
    pub budget: Option<usize>,
}

impl ResponseSink for MockSink {
    fn write(&mut self, buf: &[u8]) -> Result<usize, WriteError> {
        match self.budget {
            Some(left) if left < buf.len() => {
                self.body.extend_from_slice(&buf[..left]);
                self.budget = Some(0);
                Err(WriteError::new(left, io::ErrorKind::ConnectionReset.into()))
            }
            _ => {
                self.body.extend_from_slice(buf);
                self.budget = self.budget.map(|left| left - buf.len());
                Ok(buf.len())
            }
        }
    }

    fn set_status(&mut self, status: StatusCode) {
        self.statuses.push(status);
    }

    fn headers(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn flusher(&mut self) -> Option<&mut dyn Flusher> {
        if self.can_flush { Some(self) } else { None }
    }

    fn pusher(&mut self) -> Option<&mut dyn Pusher> {
        if self.can_push { Some(self) } else { None }
    }
}

impl Flusher for MockSink {
    fn flush(&mut self) {
        self.flushes += 1;
    }
}

impl Pusher for MockSink {
    fn push(&mut self, target: &str, opts: Option<&PushOptions>) -> Result<(), Error> {
        self.pushed.push((target.to_owned(), opts.cloned()));
        if self.push_fails {
            Err(io::Error::other("stream refused").into())
        } else {
            Ok(())
        }
    }
}

