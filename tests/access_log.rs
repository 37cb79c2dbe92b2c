//! End to end: a real server, a real TCP client, and the records it logs.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use http::{Method, StatusCode};
use httplog::{LogRecord, LogSink, LoggingHandler, Request, ResponseSink, Router, Server};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

#[derive(Default)]
struct Recorder(Mutex<Vec<LogRecord>>);

impl Recorder {
    fn take(&self) -> Vec<LogRecord> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

impl LogSink for Recorder {
    fn record(&self, record: &LogRecord) {
        self.0.lock().unwrap().push(record.clone());
    }
}

fn get_user(w: &mut dyn ResponseSink, req: &mut Request) {
    let id = req.param("id").unwrap_or("unknown").to_owned();
    w.write_all(format!(r#"{{"id":"{id}"}}"#).as_bytes()).unwrap();
}

fn create_user(w: &mut dyn ResponseSink, _req: &mut Request) {
    w.set_status(StatusCode::CREATED);
    w.write_all(b"created").unwrap();
}

fn big(w: &mut dyn ResponseSink, _req: &mut Request) {
    for _ in 0..4 {
        w.write_all(&[b'x'; 5000]).unwrap();
    }
}

fn panics(_: &mut dyn ResponseSink, _: &mut Request) {
    panic!("handler exploded");
}

struct TestServer {
    addr: SocketAddr,
    records: Arc<Recorder>,
    stop: Option<oneshot::Sender<()>>,
    done: tokio::task::JoinHandle<Result<(), httplog::Error>>,
}

impl TestServer {
    async fn start() -> Self {
        let records = Arc::new(Recorder::default());
        let app = Router::new()
            .on(Method::GET,  "/users/{id}", get_user)
            .on(Method::POST, "/users",      create_user)
            .on(Method::GET,  "/big",        big)
            .on(Method::GET,  "/panic",      panics);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop, stopped) = oneshot::channel::<()>();
        let done = tokio::spawn(Server::run(
            listener,
            LoggingHandler::new(Arc::clone(&records), app),
            async move { stopped.await.unwrap_or(()) },
        ));

        Self { addr, records, stop: Some(stop), done }
    }

    /// Sends one raw HTTP/1.1 request and returns the raw response.
    async fn send(&self, request: &str) -> String {
        let mut stream = TcpStream::connect(self.addr).await.unwrap();
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.unwrap();
        String::from_utf8(response).unwrap()
    }

    async fn shutdown(mut self) {
        let _ = self.stop.take().unwrap().send(());
        self.done.await.unwrap().unwrap();
    }
}

#[tokio::test]
async fn logs_one_combined_record_per_request() {
    let server = TestServer::start().await;

    let response = server
        .send(concat!(
            "GET /users/42?fields=name HTTP/1.1\r\n",
            "Host: localhost\r\n",
            "X-Logging-Username: alice\r\n",
            "Referer: https://example.com/\r\n",
            "User-Agent: integration-test\r\n",
            "Connection: close\r\n",
            "\r\n",
        ))
        .await;
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"), "{response}");
    assert!(response.to_ascii_lowercase().contains("content-length: 11\r\n"), "{response}");
    assert!(response.ends_with(r#"{"id":"42"}"#), "{response}");

    let records = server.records.take();
    assert_eq!(records.len(), 1);
    let rec = &records[0];
    assert_eq!(rec.host, "127.0.0.1");
    assert_eq!(rec.username, "alice");
    assert_eq!(rec.method, "GET");
    assert_eq!(rec.uri, "/users/42?fields=name");
    assert_eq!(rec.proto, "HTTP/1.1");
    assert_eq!(rec.status, 200);
    assert_eq!(rec.size, 11);
    assert_eq!(rec.referer, "https://example.com/");
    assert_eq!(rec.user_agent, "integration-test");

    server.shutdown().await;
}

#[tokio::test]
async fn explicit_status_and_anonymous_user() {
    let server = TestServer::start().await;

    let response = server
        .send("POST /users HTTP/1.1\r\nHost: localhost\r\nContent-Length: 2\r\nConnection: close\r\n\r\n{}")
        .await;
    assert!(response.starts_with("HTTP/1.1 201 Created\r\n"), "{response}");

    let records = server.records.take();
    assert_eq!(records.len(), 1);
    assert_eq!((records[0].status, records[0].size), (201, 7));
    assert_eq!(records[0].username, "-");

    server.shutdown().await;
}

#[tokio::test]
async fn unmatched_route_is_logged_as_404() {
    let server = TestServer::start().await;

    let response = server
        .send("GET /missing HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await;
    assert!(response.starts_with("HTTP/1.1 404 Not Found\r\n"), "{response}");

    let records = server.records.take();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, 404);
    assert_eq!(records[0].size, "404 page not found\n".len());

    server.shutdown().await;
}

#[tokio::test]
async fn streamed_body_is_counted_in_full() {
    let server = TestServer::start().await;

    let response = server
        .send("GET /big HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await;
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"), "{response}");
    assert_eq!(response.matches('x').count(), 20_000);

    let records = server.records.take();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].size, 20_000);

    server.shutdown().await;
}

#[tokio::test]
async fn panicking_handler_is_500_and_unlogged() {
    let server = TestServer::start().await;

    let response = server
        .send("GET /panic HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await;
    assert!(response.starts_with("HTTP/1.1 500 Internal Server Error\r\n"), "{response}");
    assert!(server.records.take().is_empty());

    server.shutdown().await;
}
