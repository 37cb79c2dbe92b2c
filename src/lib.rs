//! # httplog
//!
//! Access logging for HTTP services, in Apache Combined Log Format shape.
//! One structured record per request. Nothing more. Nothing less.
//!
//! ## The contract
//!
//! Wrap any [`Handler`] in a [`LoggingHandler`]. For every request it
//! serves, you get exactly one [`LogRecord`]:
//!
//! | field | from |
//! |---|---|
//! | `host` | peer address, port stripped |
//! | `username` | `X-Logging-Username` header, set by your auth layer, else `-` |
//! | `timestamp` | request start, RFC 3339 with nanoseconds |
//! | `method`, `uri`, `proto` | the request line |
//! | `status`, `size` | what the handler actually wrote |
//! | `referer`, `user-agent` | request headers, empty if absent |
//! | `request-time` | time spent in the handler |
//!
//! The field set is fixed and every request is logged; there is no
//! sampling. Records go to a [`LogSink`]. The default, [`TracingSink`],
//! hands them to `tracing` and your subscriber takes it from there.
//!
//! ## How status and size are known
//!
//! Handlers write into a [`ResponseSink`]. The logger slips a
//! [`ResponseObserver`] in front of the real sink, forwards every call, and
//! reads the status and byte count back once the handler returns.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use http::{Method, StatusCode};
//! use httplog::{LoggingHandler, Request, ResponseSink, Router, Server, TracingSink};
//!
//! #[tokio::main]
//! async fn main() {
//!     tracing_subscriber::fmt::init();
//!
//!     let app = Router::new()
//!         .on(Method::GET,  "/users/{id}", get_user)
//!         .on(Method::POST, "/users",      create_user);
//!
//!     Server::bind("0.0.0.0:3000")
//!         .serve(LoggingHandler::new(TracingSink, app))
//!         .await
//!         .unwrap();
//! }
//!
//! fn get_user(w: &mut dyn ResponseSink, req: &mut Request) {
//!     let id = req.param("id").unwrap_or("unknown").to_owned();
//!     let _ = w.write_all(format!(r#"{{"id":"{id}"}}"#).as_bytes());
//! }
//!
//! fn create_user(w: &mut dyn ResponseSink, req: &mut Request) {
//!     if req.body().is_empty() {
//!         w.set_status(StatusCode::BAD_REQUEST);
//!         return;
//!     }
//!     w.headers().insert("location", "/users/99".parse().unwrap());
//!     w.set_status(StatusCode::CREATED);
//! }
//! ```

mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;
mod sink;

#[cfg(test)]
mod mock;

pub mod middleware;

pub use error::{Error, WriteError};
pub use handler::{BoxedHandler, Handler};
pub use middleware::{LogRecord, LogSink, LoggingHandler, ResponseObserver, TracingSink};
pub use request::Request;
pub use response::{ResponseBody, ResponseWriter};
pub use router::Router;
pub use server::Server;
pub use sink::{Flusher, PushOptions, Pusher, ResponseSink};
