//! Incoming HTTP request type.

use bytes::Bytes;
use http::{HeaderMap, Method, Uri};

/// An incoming HTTP request with its body fully read.
///
/// Filters only ever see `&Request`: the request is shared, read-only, by
/// every slot of a pipeline.
#[derive(Debug)]
pub struct Request {
    inner: http::Request<Bytes>,
}

impl Request {
    pub fn new(inner: http::Request<Bytes>) -> Self {
        Self { inner }
    }

    pub fn method(&self) -> &Method { self.inner.method() }
    pub fn uri(&self) -> &Uri { self.inner.uri() }
    pub fn path(&self) -> &str { self.inner.uri().path() }
    pub fn headers(&self) -> &HeaderMap { self.inner.headers() }
    pub fn body(&self) -> &Bytes { self.inner.body() }

    /// Header lookup. Returns `None` for absent or non-UTF-8 values.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.inner.headers().get(name)?.to_str().ok()
    }

    /// Typed values attached by the transport (peer address, request id, …).
    pub fn extensions(&self) -> &http::Extensions { self.inner.extensions() }

    pub fn into_inner(self) -> http::Request<Bytes> {
        self.inner
    }
}

impl From<http::Request<Bytes>> for Request {
    fn from(inner: http::Request<Bytes>) -> Self {
        Self::new(inner)
    }
}
