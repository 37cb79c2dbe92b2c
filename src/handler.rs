//! The [`Handler`] trait and its type-erased form.
//!
//! # Shape of a handler
//!
//! A handler takes the response sink and the request, and writes its
//! response into the sink. It returns nothing:
//!
//! ```text
//! fn hello(w: &mut dyn ResponseSink, req: &mut Request) { … }   ← user writes this
//!        ↓ router.on(Method::GET, "/", hello)
//! Arc::new(hello)  stored as BoxedHandler = Arc<dyn Handler>
//!        ↓
//! handler.serve(w, req)  at request time                   ← one vtable dispatch
//! ```
//!
//! Because the sink is a trait object, anything between the server and the
//! handler can swap in its own sink. That is all middleware is here: a
//! `Handler` that wraps another `Handler`.
//!
//! Handlers are synchronous. The server runs them on tokio's blocking pool,
//! so a slow handler ties up a blocking thread, never a runtime worker.

use std::sync::Arc;

use crate::request::Request;
use crate::sink::ResponseSink;

/// Serves one request by writing into a response sink.
///
/// Implemented for every `Fn(&mut dyn ResponseSink, &mut Request)`, so plain
/// functions work as handlers. Implement it yourself for handlers that carry
/// state, or that wrap other handlers.
pub trait Handler: Send + Sync + 'static {
    fn serve(&self, w: &mut dyn ResponseSink, req: &mut Request);
}

impl<F> Handler for F
where
    F: Fn(&mut dyn ResponseSink, &mut Request) + Send + Sync + 'static,
{
    fn serve(&self, w: &mut dyn ResponseSink, req: &mut Request) {
        self(w, req)
    }
}

/// A heap-allocated, type-erased handler shared across concurrent requests.
///
/// `Arc` gives cheap, thread-safe shared ownership (one atomic reference
/// count increment per request) without copying the handler.
pub type BoxedHandler = Arc<dyn Handler>;

/// Erases `handler` into a [`BoxedHandler`].
pub(crate) fn boxed(handler: impl Handler) -> BoxedHandler {
    Arc::new(handler)
}
