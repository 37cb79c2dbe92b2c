//! Middleware layer.
//!
//! A middleware is a [`Handler`](crate::Handler) that wraps another one.
//! This module ships the one httplog exists for: [`LoggingHandler`], which
//! writes one Combined Log Format record per request.
//!
//! ```text
//! request ─▶ LoggingHandler ─▶ inner handler
//!                 │                  │ writes through
//!                 │            ResponseObserver ─▶ real sink
//!                 │                  │
//!                 ◀── status, size ──┘
//!                 └─▶ LogSink::record(LogRecord)
//! ```

mod logging;
mod observer;
mod record;

pub use logging::{LogSink, LoggingHandler, TracingSink};
pub use observer::ResponseObserver;
pub use record::{Field, LogRecord, NAMESPACE, USERNAME_HEADER};
