//! Detects whether a filter answered the request.
//!
//! [`ResponseObserver`] decorates the real sink. Every call is forwarded
//! unchanged; the two commit points, `write_head` and `write`, additionally
//! flip a flag first. The flag goes `false → true` once and never back.
//!
//! `write` is a commit point because a sink commits `200 OK` on the first
//! body write when nothing was committed explicitly. Watching only
//! `write_head` would miss filters that answer with a bare body.

use http::{HeaderMap, StatusCode};

use crate::response::ResponseWriter;

/// A [`ResponseWriter`] that remembers whether the response was committed
/// through it.
///
/// ```rust
/// use tsu_pipe::{Recorder, ResponseObserver, ResponseWriter};
///
/// let mut rec = Recorder::new();
/// let mut observer = ResponseObserver::new(&mut rec);
///
/// observer.headers_mut().insert("a", "1".parse().unwrap());
/// assert!(!observer.responded());
///
/// observer.write(b"OK");
/// assert!(observer.responded());
/// ```
pub struct ResponseObserver<'w> {
    inner: &'w mut dyn ResponseWriter,
    responded: bool,
}

impl<'w> ResponseObserver<'w> {
    pub fn new(inner: &'w mut dyn ResponseWriter) -> Self {
        Self { inner, responded: false }
    }

    /// `true` once `write_head` or `write` went through this observer.
    pub fn responded(&self) -> bool {
        self.responded
    }
}

impl ResponseWriter for ResponseObserver<'_> {
    fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    fn status(&self) -> Option<StatusCode> {
        self.inner.status()
    }

    fn write_head(&mut self, status: StatusCode) {
        self.responded = true;
        self.inner.write_head(status);
    }

    fn write(&mut self, chunk: &[u8]) {
        self.responded = true;
        self.inner.write(chunk);
    }
}
