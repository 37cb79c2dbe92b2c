//! Small radix-tree router, enough for demos and tests.
//!
//! One tree per HTTP method. A `Router` is itself a [`Handler`], so it can
//! sit behind [`LoggingHandler`](crate::LoggingHandler) like any other.
//! Applications with their own routing wrap that instead.

use std::collections::HashMap;

use http::{HeaderValue, Method, StatusCode, header};
use matchit::Router as MatchitRouter;

use crate::handler::{BoxedHandler, Handler, boxed};
use crate::request::Request;
use crate::sink::ResponseSink;

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
/// Each [`Router::on`] call returns `self` so registrations chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with one already
    /// registered for `method`.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, boxed(handler))
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    fn lookup(&self, req: &Request) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(req.method())?;
        let matched = tree.at(req.uri().path()).ok()?;
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((BoxedHandler::clone(matched.value), params))
    }
}

impl Handler for Router {
    fn serve(&self, w: &mut dyn ResponseSink, req: &mut Request) {
        match self.lookup(req) {
            Some((handler, params)) => {
                req.params.extend(params);
                handler.serve(w, req);
            }
            None => not_found(w),
        }
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

fn not_found(w: &mut dyn ResponseSink) {
    w.headers().insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
    w.set_status(StatusCode::NOT_FOUND);
    // The client is gone if this fails; nothing left to do.
    let _ = w.write_all(b"404 page not found\n");
}
