//! HTTP request head handling implementation.
//!
//! This module wraps the standard `http::Request` type and keeps what the
//! connection pipeline needs to know about a received request besides its
//! method, URI and folded headers: the raw header lines, and whether the
//! request allows the connection to be reused afterwards.

use bytes::Bytes;
use http::header::{CONNECTION, EXPECT, UPGRADE};
use http::{HeaderMap, Method, Request, Uri, Version};

use crate::protocol::RawHeader;

/// Represents a received HTTP request head.
///
/// This struct wraps a `http::Request<()>` to provide:
/// - Access to standard HTTP header fields
/// - The header lines as received, with their original name case
/// - Keep-alive and upgrade information derived from the headers
#[derive(Debug)]
pub struct RequestHead {
    inner: Request<()>,
    raw_headers: Vec<RawHeader>,
    upgrade: bool,
    keep_alive: bool,
}

impl AsRef<Request<()>> for RequestHead {
    fn as_ref(&self) -> &Request<()> {
        &self.inner
    }
}

impl RequestHead {
    /// Builds a request head from a folded request and its raw header lines.
    pub fn new(inner: Request<()>, raw_headers: Vec<RawHeader>) -> Self {
        let upgrade = *inner.method() == Method::CONNECT
            || (inner.headers().contains_key(UPGRADE) && has_token(inner.headers(), "upgrade"));

        let keep_alive = match inner.version() {
            Version::HTTP_11 => !has_token(inner.headers(), "close"),
            Version::HTTP_10 => has_token(inner.headers(), "keep-alive"),
            _ => false,
        };

        Self { inner, raw_headers, upgrade, keep_alive }
    }

    /// Consumes the head and returns the inner `Request<()>`.
    pub fn into_inner(self) -> Request<()> {
        self.inner
    }

    /// Attaches a body to this head, converting it into a full `Request<T>`.
    pub fn body<T>(self, body: T) -> Request<T> {
        self.inner.map(|()| body)
    }

    /// Returns a reference to the request's HTTP method.
    pub fn method(&self) -> &Method {
        self.inner.method()
    }

    /// Returns a reference to the request's URI.
    pub fn uri(&self) -> &Uri {
        self.inner.uri()
    }

    /// Returns the request's HTTP version.
    pub fn version(&self) -> Version {
        self.inner.version()
    }

    /// Returns the folded headers, see [`is_combinable`](crate::protocol::is_combinable).
    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// Returns the header lines in arrival order, with their original case.
    pub fn raw_headers(&self) -> &[RawHeader] {
        &self.raw_headers
    }

    /// Returns true for `CONNECT` and for `Connection: upgrade` requests.
    pub fn is_upgrade(&self) -> bool {
        self.upgrade
    }

    /// Returns true if the connection may carry another request after this one.
    pub fn keep_alive(&self) -> bool {
        self.keep_alive
    }

    /// Returns true if the client waits for `100 Continue` before sending the body.
    pub fn expects_continue(&self) -> bool {
        self.version() == Version::HTTP_11
            && self.headers().get(EXPECT).is_some_and(|value| value.as_bytes().eq_ignore_ascii_case(b"100-continue"))
    }
}

/// Converts a bodyless request into a RequestHead, deriving the raw lines from the folded map.
impl From<Request<()>> for RequestHead {
    fn from(inner: Request<()>) -> Self {
        let raw_headers = inner
            .headers()
            .iter()
            .map(|(name, value)| RawHeader { name: Bytes::copy_from_slice(name.as_str().as_bytes()), value: value.clone() })
            .collect();
        Self::new(inner, raw_headers)
    }
}

fn has_token(headers: &HeaderMap, token: &str) -> bool {
    headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .any(|item| item.trim().eq_ignore_ascii_case(token))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn head(version: Version, connection: Option<&str>) -> RequestHead {
        let mut builder = Request::builder().method(Method::GET).uri("/").version(version);
        if let Some(value) = connection {
            builder = builder.header(CONNECTION, value);
        }
        RequestHead::from(builder.body(()).unwrap())
    }

    #[test]
    fn keep_alive_defaults() {
        assert!(head(Version::HTTP_11, None).keep_alive());
        assert!(!head(Version::HTTP_11, Some("close")).keep_alive());
        assert!(!head(Version::HTTP_10, None).keep_alive());
        assert!(head(Version::HTTP_10, Some("Keep-Alive")).keep_alive());
    }

    #[test]
    fn upgrade_needs_both_headers() {
        let request = Request::builder()
            .uri("/chat")
            .header(CONNECTION, "keep-alive, Upgrade")
            .header(UPGRADE, "websocket")
            .body(())
            .unwrap();
        assert!(RequestHead::from(request).is_upgrade());

        let request = Request::builder().uri("/chat").header(UPGRADE, "websocket").body(()).unwrap();
        assert!(!RequestHead::from(request).is_upgrade());

        let request = Request::builder().method(Method::CONNECT).uri("example.com:443").body(()).unwrap();
        assert!(RequestHead::from(request).is_upgrade());
    }

    #[test]
    fn expect_continue() {
        let request = Request::builder().method(Method::POST).uri("/").header(EXPECT, "100-Continue").body(()).unwrap();
        assert!(RequestHead::from(request).expects_continue());
        assert!(!head(Version::HTTP_11, None).expects_continue());
    }
}
