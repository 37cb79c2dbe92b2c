//! Minimal httplog example: a few JSON endpoints behind the access logger.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/users/42
//!   curl -H 'X-Logging-Username: alice' http://localhost:3000/users/42
//!   curl -X POST http://localhost:3000/users -d '{"name":"alice"}'
//!   curl -X DELETE http://localhost:3000/users/42
//!   curl http://localhost:3000/nope
//!
//! Each request prints one JSON line carrying the `http.*` fields.

use http::{HeaderValue, Method, StatusCode, header};
use httplog::{LoggingHandler, Request, ResponseSink, Router, Server, TracingSink};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let app = Router::new()
        .on(Method::GET,    "/users/{id}", get_user)
        .on(Method::POST,   "/users",      create_user)
        .on(Method::DELETE, "/users/{id}", delete_user)
        .on(Method::GET,    "/stream",     stream);

    Server::bind("0.0.0.0:3000")
        .serve(LoggingHandler::new(TracingSink, app))
        .await
        .expect("server error");
}

// GET /users/{id}
fn get_user(w: &mut dyn ResponseSink, req: &mut Request) {
    let id = req.param("id").unwrap_or("unknown").to_owned();
    w.headers().insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    let _ = w.write_all(format!(r#"{{"id":"{id}","name":"alice"}}"#).as_bytes());
}

// POST /users
fn create_user(w: &mut dyn ResponseSink, req: &mut Request) {
    if req.body().is_empty() {
        w.set_status(StatusCode::BAD_REQUEST);
        return;
    }

    w.headers().insert(header::LOCATION, HeaderValue::from_static("/users/99"));
    w.headers().insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    w.set_status(StatusCode::CREATED);
    let _ = w.write_all(br#"{"id":"99","name":"new_user"}"#);
}

// DELETE /users/{id} → 204 No Content
fn delete_user(w: &mut dyn ResponseSink, _req: &mut Request) {
    w.set_status(StatusCode::NO_CONTENT);
}

// GET /stream, one line per flush
fn stream(w: &mut dyn ResponseSink, _req: &mut Request) {
    for i in 0..5 {
        if w.write_all(format!("tick {i}\n").as_bytes()).is_err() {
            return;
        }
        if let Some(flusher) = w.flusher() {
            flusher.flush();
        }
        std::thread::sleep(std::time::Duration::from_millis(200));
    }
}
