//! HTTP transport used by the [Client](crate::Client).
//!
//! The client never talks to the network itself. It builds a [Request], hands
//! it to a [Transport] and classifies the returned [Response]. Swap the
//! transport to change TLS or proxy settings, or to test without a network.

use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde_json::Value as JsonValue;
use url::Url;

use crate::TransportError;

/// Timeout of the default transport.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// A request ready to be sent.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<JsonValue>,
    /// Time left until the caller's deadline, if it set one.
    ///
    /// Transports with a timeout of their own must apply the shorter of the two.
    pub timeout: Option<Duration>,
}

/// A response whose body has been read completely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: StatusCode,
    pub body: String,
}

impl Response {
    /// Creates a response from a status and a body.
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Executes requests, returning the status and body or a transport failure.
pub trait Transport: Send + Sync {
    /// Sends the request and reads the whole response.
    fn execute(&self, request: Request) -> Result<Response, TransportError>;
}

/// [Transport] backed by a blocking reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
    timeout: Option<Duration>,
}

impl ReqwestTransport {
    /// Creates a transport whose requests time out after `timeout`.
    ///
    /// A shorter deadline on a request takes precedence, a longer one doesn't.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder().build()?;
        Ok(Self {
            client,
            timeout: Some(timeout),
        })
    }

    /// Wraps an already configured reqwest client.
    ///
    /// reqwest lets a per-request timeout replace the client's own, so a
    /// request with a deadline runs until that deadline even if `client`
    /// was built with a shorter timeout. Use [ReqwestTransport::new] to have
    /// both apply.
    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        Self {
            client,
            timeout: None,
        }
    }

    /// The timeout to set on a request, the shorter of ours and its own.
    fn effective_timeout(&self, requested: Option<Duration>) -> Option<Duration> {
        match (self.timeout, requested) {
            (Some(ours), Some(requested)) => Some(ours.min(requested)),
            (ours, requested) => ours.or(requested),
        }
    }
}

impl Transport for ReqwestTransport {
    fn execute(&self, request: Request) -> Result<Response, TransportError> {
        let Request {
            method,
            url,
            headers,
            body,
            timeout,
        } = request;

        let mut builder = self.client.request(method, url).headers(headers);
        if let Some(body) = body {
            // Content-Type is already in the headers, so json() keeps ours.
            builder = builder.json(&body);
        }
        if let Some(timeout) = self.effective_timeout(timeout) {
            builder = builder.timeout(timeout);
        }

        let resp = builder.send()?;
        let status = resp.status();
        let body = resp.text()?;

        Ok(Response { status, body })
    }
}

/// Closures can serve as transports, which is mostly useful in tests.
impl<F> Transport for F
where
    F: Fn(Request) -> Result<Response, TransportError> + Send + Sync,
{
    fn execute(&self, request: Request) -> Result<Response, TransportError> {
        self(request)
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Write};
    use std::net::{TcpListener, TcpStream};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Instant;

    use reqwest::header::HeaderValue;

    use super::*;

    /// Reads the request head, returning it lowercased.
    fn read_head(stream: &TcpStream) -> String {
        let mut reader = BufReader::new(stream);
        let mut head = String::new();
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                break;
            }
            head.push_str(&line.to_lowercase());
        }
        head
    }

    /// Serves one connection, waiting `delay` before answering with `response`.
    ///
    /// Returns the URL to send to and a receiver for the request head.
    fn serve_once(delay: Duration, response: &'static str) -> (Url, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let _ = tx.send(read_head(&stream));
            thread::sleep(delay);
            let _ = stream.write_all(response.as_bytes());
        });
        let url = format!("http://{addr}/api/v1/records").parse().unwrap();
        (url, rx)
    }

    fn request(url: Url, timeout: Option<Duration>) -> Request {
        let mut headers = HeaderMap::new();
        headers.insert("auth-api-token", HeaderValue::from_static("t0k3n"));
        Request {
            method: Method::GET,
            url,
            headers,
            body: None,
            timeout,
        }
    }

    #[test]
    fn reads_status_and_whole_body() {
        let (url, head) = serve_once(
            Duration::ZERO,
            "HTTP/1.1 201 Created\r\nContent-Length: 13\r\nConnection: close\r\n\r\n{\"zone\": {}}\n",
        );
        let transport = ReqwestTransport::new(DEFAULT_TIMEOUT).unwrap();

        let resp = transport.execute(request(url, None)).unwrap();

        assert_eq!(resp, Response::new(StatusCode::CREATED, "{\"zone\": {}}\n"));
        let head = head.recv().unwrap();
        assert!(head.starts_with("get /api/v1/records http/1.1"));
        assert!(head.contains("auth-api-token: t0k3n"));
    }

    #[test]
    fn own_timeout_caps_longer_deadline() {
        let (url, _head) = serve_once(Duration::from_secs(3), "HTTP/1.1 200 OK\r\n\r\n");
        let transport = ReqwestTransport::new(Duration::from_millis(300)).unwrap();

        let start = Instant::now();
        let err = transport
            .execute(request(url, Some(Duration::from_secs(30))))
            .unwrap_err();

        assert!(matches!(err, TransportError::Timeout(_)), "unexpected error: {err:?}");
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn shorter_deadline_wins() {
        let (url, _head) = serve_once(Duration::from_secs(3), "HTTP/1.1 200 OK\r\n\r\n");
        let transport = ReqwestTransport::new(Duration::from_secs(30)).unwrap();

        let start = Instant::now();
        let err = transport
            .execute(request(url, Some(Duration::from_millis(300))))
            .unwrap_err();

        assert!(matches!(err, TransportError::Timeout(_)), "unexpected error: {err:?}");
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn effective_timeout_is_the_minimum() {
        let transport = ReqwestTransport::new(DEFAULT_TIMEOUT).unwrap();
        let second = Duration::from_secs(1);
        let minute = Duration::from_secs(60);

        assert_eq!(transport.effective_timeout(None), Some(DEFAULT_TIMEOUT));
        assert_eq!(transport.effective_timeout(Some(second)), Some(second));
        assert_eq!(transport.effective_timeout(Some(minute)), Some(DEFAULT_TIMEOUT));

        let unbounded = ReqwestTransport::with_client(reqwest::blocking::Client::new());
        assert_eq!(unbounded.effective_timeout(None), None);
        assert_eq!(unbounded.effective_timeout(Some(minute)), Some(minute));
    }
}
