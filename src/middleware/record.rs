//! One access-log entry per request, in Apache Combined Log Format shape.

use std::borrow::Cow;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Local, SecondsFormat};
use http::{HeaderName, Method, StatusCode, Uri, header};

use crate::request::Request;

/// Namespace every record's fields are logged under.
pub const NAMESPACE: &str = "http";

/// Header an upstream authentication step sets to the authenticated user.
/// Trusted as-is.
pub const USERNAME_HEADER: &str = "x-logging-username";

/// A finished request, ready for a [`LogSink`](super::LogSink).
#[derive(Clone, Debug, PartialEq)]
pub struct LogRecord {
    pub host: String,
    pub username: String,
    /// Request start, RFC 3339 with all nine fraction digits and a numeric
    /// offset (`+00:00`, never `Z`).
    pub timestamp: String,
    pub method: String,
    pub uri: String,
    pub proto: String,
    pub status: u16,
    pub size: usize,
    pub referer: String,
    pub user_agent: String,
    pub request_time: Duration,
}

/// A typed field value, as handed to structured log backends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Field<'a> {
    Str(&'a str),
    Int(u64),
    Duration(Duration),
}

impl LogRecord {
    /// Builds the record for `req`.
    ///
    /// `url` is the URI as it was before the handler ran; everything else is
    /// read from `req` as it is now.
    pub fn capture(
        req: &Request,
        url: &Uri,
        started_at: DateTime<Local>,
        status: StatusCode,
        size: usize,
        request_time: Duration,
    ) -> Self {
        Self {
            host: client_host(req.remote_addr()).to_owned(),
            username: username(req).into_owned(),
            timestamp: started_at.to_rfc3339_opts(SecondsFormat::Nanos, false),
            method: req.method().as_str().to_owned(),
            uri: request_uri(req, url),
            proto: req.proto().to_owned(),
            status: status.as_u16(),
            size,
            referer: header_text(req, header::REFERER),
            user_agent: header_text(req, header::USER_AGENT),
            request_time,
        }
    }

    /// The record's fields in schema order.
    pub fn fields(&self) -> [(&'static str, Field<'_>); 11] {
        [
            ("host",         Field::Str(&self.host)),
            ("username",     Field::Str(&self.username)),
            ("timestamp",    Field::Str(&self.timestamp)),
            ("method",       Field::Str(&self.method)),
            ("uri",          Field::Str(&self.uri)),
            ("proto",        Field::Str(&self.proto)),
            ("status",       Field::Int(u64::from(self.status))),
            ("size",         Field::Int(self.size as u64)),
            ("referer",      Field::Str(&self.referer)),
            ("user-agent",   Field::Str(&self.user_agent)),
            ("request-time", Field::Duration(self.request_time)),
        ]
    }
}

/// Combined Log Format:
/// `host - user [time] "METHOD uri proto" status size "referer" "user-agent"`.
impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            r#"{} - {} [{}] "{} {} {}" {} {} "{}" "{}""#,
            self.host,
            self.username,
            self.timestamp,
            self.method,
            self.uri,
            self.proto,
            self.status,
            self.size,
            self.referer,
            self.user_agent,
        )
    }
}

// ── Field derivation ──────────────────────────────────────────────────────────

fn username(req: &Request) -> Cow<'_, str> {
    match req.header_lossy(USERNAME_HEADER) {
        Some(name) if !name.is_empty() => name,
        _ => Cow::Borrowed("-"),
    }
}

/// Header value as logged: verbatim, empty when absent.
fn header_text(req: &Request, name: HeaderName) -> String {
    req.header_lossy(name.as_str()).map(Cow::into_owned).unwrap_or_default()
}

/// `remote_addr` without its port; unchanged if it has no `host:port` shape.
fn client_host(remote_addr: &str) -> &str {
    split_host(remote_addr).unwrap_or(remote_addr)
}

/// Host part of `host:port`, `[v6]:port` or `v4:port`. `None` when the
/// address is missing a port or has stray colons or brackets.
fn split_host(addr: &str) -> Option<&str> {
    let bad = |s: &str| s.contains(['[', ']']);

    if let Some(rest) = addr.strip_prefix('[') {
        let (host, tail) = rest.split_once(']')?;
        let port = tail.strip_prefix(':')?;
        if port.contains(':') || bad(host) || bad(port) {
            return None;
        }
        return Some(host);
    }

    let (host, port) = addr.rsplit_once(':')?;
    if host.contains(':') || bad(host) || bad(port) {
        return None;
    }
    Some(host)
}

/// Request URI for the log line. Checked in order: HTTP/2 `CONNECT` logs the
/// target host; otherwise the raw request-target; if that is empty, the
/// pre-handler URL.
fn request_uri(req: &Request, url: &Uri) -> String {
    let uri = if req.proto_major() == 2 && *req.method() == Method::CONNECT {
        req.host()
    } else {
        req.target()
    };

    if !uri.is_empty() {
        return uri.to_owned();
    }
    match url.path_and_query().map(|pq| pq.as_str()) {
        Some(pq) if !pq.is_empty() => pq.to_owned(),
        _ => "/".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use http::{HeaderValue, Version};

    use super::*;
    use crate::request::test_request;

    fn record(req: &Request) -> LogRecord {
        LogRecord::capture(
            req,
            req.uri(),
            Local::now(),
            StatusCode::OK,
            0,
            Duration::from_millis(3),
        )
    }

    #[test]
    fn username_from_header_or_placeholder() {
        let mut req = test_request(Method::GET, "/", Version::HTTP_11);
        assert_eq!(username(&req), "-");

        req.headers_mut().insert("X-Logging-Username", HeaderValue::from_static(""));
        assert_eq!(username(&req), "-");

        req.headers_mut().insert("X-Logging-Username", HeaderValue::from_static("alice"));
        assert_eq!(username(&req), "alice");
    }

    #[test]
    fn host_strips_port() {
        assert_eq!(client_host("10.0.0.5:54321"), "10.0.0.5");
        assert_eq!(client_host("[::1]:8080"), "::1");
        assert_eq!(client_host("gateway.internal:80"), "gateway.internal");
        assert_eq!(client_host(":80"), "");
    }

    #[test]
    fn unsplittable_host_is_kept_raw() {
        for raw in ["not-an-addr", "::1", "[::1]", "[::1]80", "1:2:3", "@"] {
            assert_eq!(client_host(raw), raw);
        }
    }

    #[test]
    fn uri_is_the_raw_target() {
        let req = test_request(Method::GET, "/search?q=rust", Version::HTTP_11);
        assert_eq!(record(&req).uri, "/search?q=rust");
    }

    #[test]
    fn http2_connect_logs_the_host() {
        let mut req = test_request(Method::CONNECT, "example.com:443", Version::HTTP_2);
        req.target = "/ignored".to_owned();
        assert_eq!(record(&req).uri, "example.com:443");
    }

    #[test]
    fn http1_connect_keeps_the_target() {
        let req = test_request(Method::CONNECT, "example.com:443", Version::HTTP_11);
        assert_eq!(record(&req).uri, "example.com:443");
    }

    #[test]
    fn empty_target_falls_back_to_captured_url() {
        let mut req = test_request(Method::GET, "/before?x=1", Version::HTTP_11);
        let url = req.uri().clone();
        req.target.clear();
        *req.uri_mut() = "/after".parse().unwrap();

        let rec = LogRecord::capture(&req, &url, Local::now(), StatusCode::OK, 0, Duration::ZERO);
        assert_eq!(rec.uri, "/before?x=1");
    }

    #[test]
    fn empty_target_and_pathless_url_log_root() {
        let mut req = test_request(Method::OPTIONS, "example.com:443", Version::HTTP_11);
        req.target.clear();
        assert_eq!(record(&req).uri, "/");
    }

    #[test]
    fn referer_and_user_agent_default_to_empty() {
        let mut req = test_request(Method::GET, "/", Version::HTTP_11);
        let rec = record(&req);
        assert_eq!((rec.referer.as_str(), rec.user_agent.as_str()), ("", ""));

        req.headers_mut().insert(header::REFERER, HeaderValue::from_static("https://example.com/"));
        req.headers_mut().insert(header::USER_AGENT, HeaderValue::from_static("curl/8.5.0"));
        let rec = record(&req);
        assert_eq!(rec.referer, "https://example.com/");
        assert_eq!(rec.user_agent, "curl/8.5.0");
    }

    #[test]
    fn non_ascii_headers_are_logged_verbatim() {
        let mut req = test_request(Method::GET, "/", Version::HTTP_11);
        let value = |s: &str| HeaderValue::from_bytes(s.as_bytes()).unwrap();
        req.headers_mut().insert("X-Logging-Username", value("josé"));
        req.headers_mut().insert(header::USER_AGENT, value("Navegador/1.0 (español)"));
        req.headers_mut().insert(header::REFERER, HeaderValue::from_bytes(b"https://example.com/caf\xe9").unwrap());

        let rec = record(&req);
        assert_eq!(rec.username, "josé");
        assert_eq!(rec.user_agent, "Navegador/1.0 (español)");
        assert_eq!(rec.referer, "https://example.com/caf\u{fffd}");
    }

    #[test]
    fn timestamp_is_rfc3339_with_nanos() {
        let req = test_request(Method::GET, "/", Version::HTTP_11);
        let rec = record(&req);
        let parsed = DateTime::parse_from_rfc3339(&rec.timestamp).unwrap();
        assert_eq!(parsed.to_rfc3339_opts(SecondsFormat::Nanos, false), rec.timestamp);
        let (_, fraction) = rec.timestamp.split_once('.').unwrap();
        assert!(fraction[..9].bytes().all(|b| b.is_ascii_digit()));
    }

    #[test]
    fn fields_follow_schema_order() {
        let req = test_request(Method::GET, "/", Version::HTTP_11);
        let names: Vec<_> = record(&req).fields().iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            [
                "host", "username", "timestamp", "method", "uri", "proto",
                "status", "size", "referer", "user-agent", "request-time",
            ],
        );
    }

    #[test]
    fn displays_as_combined_log_format() {
        let rec = LogRecord {
            host: "10.0.0.5".into(),
            username: "alice".into(),
            timestamp: "2026-10-18T09:30:00.123456789+00:00".into(),
            method: "GET".into(),
            uri: "/users/42".into(),
            proto: "HTTP/1.1".into(),
            status: 200,
            size: 27,
            referer: "".into(),
            user_agent: "curl/8.5.0".into(),
            request_time: Duration::from_micros(250),
        };
        assert_eq!(
            rec.to_string(),
            r#"10.0.0.5 - alice [2026-10-18T09:30:00.123456789+00:00] "GET /users/42 HTTP/1.1" 200 27 "" "curl/8.5.0""#,
        );
    }
}
