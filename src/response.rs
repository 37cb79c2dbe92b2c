//! The server's own [`ResponseSink`]: streams what a handler writes back to
//! hyper.
//!
//! You should not need to think about this module directly. Your handler
//! gets a `&mut dyn ResponseSink`; this is what sits at the bottom of it.
//!
//! # Life of a response
//!
//! ```text
//! handler (blocking pool)                     hyper (async)
//! ───────────────────────                     ─────────────
//! set_status / first chunk ── Head ─oneshot─▶ http::Response<ResponseBody>
//! write → buffer ≥ 8 KiB   ── Bytes ──mpsc──▶ body frames
//! flush                    ── Bytes ──mpsc──▶ body frames
//! handler returns          ── drop senders ─▶ end of body
//! ```
//!
//! The head is committed by the first of `set_status`, a flush, or the
//! buffer filling up. A response that is never committed while the handler
//! runs goes out in one piece with a `Content-Length`.

use std::convert::Infallible;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Bytes, BytesMut};
use http::{HeaderMap, HeaderValue, StatusCode, header};
use http_body::{Body, Frame};
use tokio::sync::{mpsc, oneshot};
use tracing::warn;

use crate::error::WriteError;
use crate::sink::{Flusher, ResponseSink};

/// Buffered body bytes beyond this are streamed as a chunk.
const CHUNK_SIZE: usize = 8 * 1024;

/// Body chunks in flight between the handler and hyper.
const CHANNEL_DEPTH: usize = 16;

// ── Head ──────────────────────────────────────────────────────────────────────

/// Status line and headers, committed once per response.
pub(crate) struct Head {
    status: StatusCode,
    headers: HeaderMap,
}

impl Head {
    pub(crate) fn into_response(self, body: ResponseBody) -> http::Response<ResponseBody> {
        let mut response = http::Response::new(body);
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

// ── ResponseWriter ────────────────────────────────────────────────────────────

/// The real response sink the server hands to the handler chain.
///
/// Runs on a blocking-pool thread: all sends block rather than await.
pub struct ResponseWriter {
    status: StatusCode,
    headers: HeaderMap,
    buf: BytesMut,
    head_tx: Option<oneshot::Sender<Head>>,
    body_tx: mpsc::Sender<Bytes>,
}

impl ResponseWriter {
    pub(crate) fn new(head_tx: oneshot::Sender<Head>, body_tx: mpsc::Sender<Bytes>) -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            buf: BytesMut::new(),
            head_tx: Some(head_tx),
            body_tx,
        }
    }

    fn committed(&self) -> bool {
        self.head_tx.is_none()
    }

    fn commit(&mut self) {
        let Some(head_tx) = self.head_tx.take() else { return };
        let head = Head { status: self.status, headers: std::mem::take(&mut self.headers) };
        // A dropped receiver means the connection is gone; the next body
        // send reports it.
        let _ = head_tx.send(head);
    }

    /// Commits the head if needed and streams the buffered bytes.
    fn send_buffered(&mut self) -> io::Result<()> {
        self.commit();
        if self.buf.is_empty() {
            return Ok(());
        }
        let chunk = self.buf.split().freeze();
        self.body_tx
            .blocking_send(chunk)
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "client disconnected"))
    }

    /// Completes the response once the handler has returned.
    pub(crate) fn finish(mut self) {
        if !self.committed() && body_allowed(self.status) && !self.headers.contains_key(header::CONTENT_LENGTH) {
            self.headers.insert(header::CONTENT_LENGTH, HeaderValue::from(self.buf.len()));
        }
        // Nobody is left to tell about a failure here.
        let _ = self.send_buffered();
    }
}

impl ResponseSink for ResponseWriter {
    /// Buffers `buf`, sending a chunk once [`CHUNK_SIZE`] bytes are waiting.
    ///
    /// A failed send loses the whole buffer, this call's bytes included, so
    /// the error reports 0 bytes written.
    fn write(&mut self, buf: &[u8]) -> Result<usize, WriteError> {
        if self.body_tx.is_closed() {
            return Err(WriteError::new(
                0,
                io::Error::new(io::ErrorKind::BrokenPipe, "client disconnected"),
            ));
        }
        self.buf.extend_from_slice(buf);
        if self.buf.len() >= CHUNK_SIZE {
            self.send_buffered().map_err(|e| WriteError::new(0, e))?;
        }
        Ok(buf.len())
    }

    fn set_status(&mut self, status: StatusCode) {
        if self.committed() {
            warn!(%status, "superfluous set_status call, response head already sent");
            return;
        }
        self.status = status;
        self.commit();
    }

    fn headers(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn flusher(&mut self) -> Option<&mut dyn Flusher> {
        Some(self)
    }
}

impl Flusher for ResponseWriter {
    fn flush(&mut self) {
        // A failed flush surfaces on the next write.
        let _ = self.send_buffered();
    }
}

fn body_allowed(status: StatusCode) -> bool {
    !(status.is_informational() || status == StatusCode::NO_CONTENT || status == StatusCode::NOT_MODIFIED)
}

// ── ResponseBody ──────────────────────────────────────────────────────────────

/// Streaming response body fed by a [`ResponseWriter`].
pub struct ResponseBody {
    rx: mpsc::Receiver<Bytes>,
}

impl ResponseBody {
    pub(crate) fn new(rx: mpsc::Receiver<Bytes>) -> Self {
        Self { rx }
    }

    /// A body that ends immediately.
    pub(crate) fn empty() -> Self {
        let (_, rx) = mpsc::channel(1);
        Self { rx }
    }
}

impl Body for ResponseBody {
    type Data = Bytes;
    type Error = Infallible;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Bytes>, Infallible>>> {
        self.rx.poll_recv(cx).map(|chunk| chunk.map(|bytes| Ok(Frame::data(bytes))))
    }
}

/// Creates a connected writer/body pair plus the receiver for the head.
pub(crate) fn channel() -> (ResponseWriter, oneshot::Receiver<Head>, ResponseBody) {
    let (head_tx, head_rx) = oneshot::channel();
    let (body_tx, body_rx) = mpsc::channel(CHANNEL_DEPTH);
    (ResponseWriter::new(head_tx, body_tx), head_rx, ResponseBody::new(body_rx))
}
