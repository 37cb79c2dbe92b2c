//! Access logging: one [`LogRecord`] per request.

use std::sync::Arc;
use std::time::Instant;

use chrono::Local;
use tracing::{Level, event};

use super::observer::ResponseObserver;
use super::record::{LogRecord, NAMESPACE};
use crate::handler::Handler;
use crate::request::Request;
use crate::sink::ResponseSink;

/// Where finished [`LogRecord`]s go.
///
/// Called from many requests at once, so implementations must be safe for
/// concurrent use. Records from concurrent requests arrive in no particular
/// order.
pub trait LogSink: Send + Sync + 'static {
    fn record(&self, record: &LogRecord);
}

impl<L: LogSink + ?Sized> LogSink for Arc<L> {
    fn record(&self, record: &LogRecord) {
        (**self).record(record)
    }
}

impl<L: LogSink + ?Sized> LogSink for Box<L> {
    fn record(&self, record: &LogRecord) {
        (**self).record(record)
    }
}

/// Emits each record as a `tracing` event: level INFO, target
/// [`NAMESPACE`], message `Request`, one `http.<name>` field per entry of
/// [`LogRecord::fields`].
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn record(&self, r: &LogRecord) {
        event!(
            target: NAMESPACE,
            Level::INFO,
            "http.host" = %r.host,
            "http.username" = %r.username,
            "http.timestamp" = %r.timestamp,
            "http.method" = %r.method,
            "http.uri" = %r.uri,
            "http.proto" = %r.proto,
            "http.status" = u64::from(r.status),
            "http.size" = r.size as u64,
            "http.referer" = %r.referer,
            "http.user-agent" = %r.user_agent,
            "http.request-time" = ?r.request_time,
            "Request"
        );
    }
}

/// Wraps a handler and logs every request it serves.
///
/// ```rust,no_run
/// use http::Method;
/// use httplog::{LoggingHandler, Request, ResponseSink, Router, Server, TracingSink};
///
/// fn hello(w: &mut dyn ResponseSink, _req: &mut Request) {
///     let _ = w.write_all(b"This is a catch-all route");
/// }
///
/// # async fn run() -> Result<(), httplog::Error> {
/// let router = Router::new().on(Method::GET, "/", hello);
/// Server::bind("0.0.0.0:1123")
///     .serve(LoggingHandler::new(TracingSink, router))
///     .await
/// # }
/// ```
pub struct LoggingHandler<H, L = TracingSink> {
    sink: L,
    handler: H,
}

impl<H: Handler, L: LogSink> LoggingHandler<H, L> {
    pub fn new(sink: L, handler: H) -> Self {
        Self { sink, handler }
    }
}

impl<H: Handler, L: LogSink> Handler for LoggingHandler<H, L> {
    fn serve(&self, w: &mut dyn ResponseSink, req: &mut Request) {
        let started_at = Local::now();
        let clock = Instant::now();
        // The handler may rewrite the request; log what came in.
        let url = req.uri().clone();

        let mut observer = ResponseObserver::new(w);
        self.handler.serve(&mut observer, req);

        let record = LogRecord::capture(
            req,
            &url,
            started_at,
            observer.status(),
            observer.size(),
            clock.elapsed(),
        );
        self.sink.record(&record);
    }
}
