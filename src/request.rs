//! Incoming HTTP request type.

use std::borrow::Cow;
use std::collections::HashMap;

use bytes::Bytes;
use http::{HeaderMap, Method, Uri, Version, header};

/// An incoming HTTP request, with its body already collected.
///
/// Handlers receive `&mut Request` and may rewrite it (the router stores
/// path parameters here, a handler may rewrite the URI).
pub struct Request {
    pub(crate) method: Method,
    pub(crate) uri: Uri,
    pub(crate) target: String,
    pub(crate) version: Version,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Bytes,
    pub(crate) remote_addr: String,
    pub(crate) params: HashMap<String, String>,
}

impl Request {
    pub(crate) fn new(parts: http::request::Parts, body: Bytes, remote_addr: String) -> Self {
        // HTTP/2 carries the target in `:path`, which CONNECT omits. hyper
        // folds scheme and authority into the URI, so read the path back out.
        let target = match parts.version {
            Version::HTTP_2 | Version::HTTP_3 => parts.uri.path_and_query()
                .map(|pq| pq.as_str().to_owned())
                .unwrap_or_default(),
            _ => parts.uri.to_string(),
        };

        Self {
            method: parts.method,
            uri: parts.uri,
            target,
            version: parts.version,
            headers: parts.headers,
            body,
            remote_addr,
            params: HashMap::new(),
        }
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn uri(&self) -> &Uri { &self.uri }
    pub fn uri_mut(&mut self) -> &mut Uri { &mut self.uri }
    pub fn version(&self) -> Version { self.version }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn headers_mut(&mut self) -> &mut HeaderMap { &mut self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// The request-target exactly as received. Empty when the transport did
    /// not carry one (HTTP/2 `CONNECT`).
    pub fn target(&self) -> &str { &self.target }

    /// Peer address as `ip:port`, or whatever the transport reported.
    pub fn remote_addr(&self) -> &str { &self.remote_addr }

    /// The host the request is addressed to: the URI authority if present,
    /// otherwise the `Host` header.
    pub fn host(&self) -> &str {
        match self.uri.authority() {
            Some(authority) => authority.as_str(),
            None => self.header(header::HOST.as_str()).unwrap_or(""),
        }
    }

    /// Protocol string in request-line form, e.g. `HTTP/1.1` or `HTTP/2.0`.
    pub fn proto(&self) -> &'static str {
        match self.version {
            Version::HTTP_09 => "HTTP/0.9",
            Version::HTTP_10 => "HTTP/1.0",
            Version::HTTP_11 => "HTTP/1.1",
            Version::HTTP_2 => "HTTP/2.0",
            Version::HTTP_3 => "HTTP/3.0",
            _ => "HTTP/1.1",
        }
    }

    pub fn proto_major(&self) -> u8 {
        match self.version {
            Version::HTTP_09 => 0,
            Version::HTTP_2 => 2,
            Version::HTTP_3 => 3,
            _ => 1,
        }
    }

    /// Case-insensitive header lookup. Non-UTF-8 values read as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Header value as text, byte for byte. Bytes that are not valid UTF-8
    /// come out as U+FFFD instead of hiding the whole value.
    pub fn header_lossy(&self, name: &str) -> Option<Cow<'_, str>> {
        self.headers.get(name).map(|v| String::from_utf8_lossy(v.as_bytes()))
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

#[cfg(test)]
pub(crate) fn test_request(method: Method, uri: &str, version: Version) -> Request {
    let (parts, ()) = http::Request::builder()
        .method(method)
        .uri(uri)
        .version(version)
        .body(())
        .map(http::Request::into_parts)
        .unwrap_or_else(|e| panic!("bad test request `{uri}`: {e}"));
    Request::new(parts, Bytes::new(), "10.0.0.5:54321".to_owned())
}
