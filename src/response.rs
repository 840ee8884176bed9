//! The response sink filters write through, and a buffered implementation.
//!
//! A sink has two phases. Before the **commit** it collects headers; the
//! commit fixes the status and the header set; after it, only body bytes can
//! be added. Committing happens explicitly through [`ResponseWriter::write_head`]
//! or implicitly, with `200 OK`, on the first [`ResponseWriter::write`].

use bytes::{Bytes, BytesMut};
use http::{HeaderMap, StatusCode};
use http_body_util::Full;
use tracing::warn;

// ── ResponseWriter ────────────────────────────────────────────────────────────

/// The mutable object through which headers, status, and body bytes are
/// written back to the caller.
pub trait ResponseWriter: Send {
    /// Headers that will be sent on commit.
    fn headers(&self) -> &HeaderMap;

    /// Mutable access to the pending header set. Changes made after the
    /// commit are not sent.
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// The committed status, or `None` while the response is still open.
    fn status(&self) -> Option<StatusCode>;

    /// Commits the response with `status` and the current headers.
    fn write_head(&mut self, status: StatusCode);

    /// Appends body bytes, committing with `200 OK` first if needed.
    fn write(&mut self, chunk: &[u8]);
}

// ── Recorder ──────────────────────────────────────────────────────────────────

/// An in-memory [`ResponseWriter`].
///
/// The transport adapter runs a pipeline against a `Recorder` and turns it
/// into an [`http::Response`] afterwards. Tests use it to inspect exactly what
/// a filter wrote.
///
/// ```rust
/// use tsu_pipe::{Recorder, ResponseWriter};
/// use http::StatusCode;
///
/// let mut rec = Recorder::new();
/// rec.write_head(StatusCode::CREATED);
/// rec.write(b"done");
///
/// assert_eq!(rec.status(), Some(StatusCode::CREATED));
/// assert_eq!(rec.body(), b"done");
/// ```
#[derive(Debug, Default)]
pub struct Recorder {
    headers: HeaderMap,
    committed: Option<(StatusCode, HeaderMap)>,
    body: BytesMut,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The header set fixed at commit time, if committed.
    pub fn committed_headers(&self) -> Option<&HeaderMap> {
        self.committed.as_ref().map(|(_, headers)| headers)
    }

    /// Converts the recorded writes into a response a transport can send.
    ///
    /// A recorder nobody committed becomes `200 OK` with its pending headers.
    pub fn into_response(self) -> http::Response<Full<Bytes>> {
        let (status, headers) = self.committed.unwrap_or((StatusCode::OK, self.headers));

        let mut response = http::Response::new(Full::new(self.body.freeze()));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }
}

impl ResponseWriter for Recorder {
    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn status(&self) -> Option<StatusCode> {
        self.committed.as_ref().map(|(status, _)| *status)
    }

    fn write_head(&mut self, status: StatusCode) {
        if let Some((first, _)) = &self.committed {
            warn!(%first, ignored = %status, "superfluous write_head call");
            return;
        }
        self.committed = Some((status, self.headers.clone()));
    }

    fn write(&mut self, chunk: &[u8]) {
        if self.committed.is_none() {
            self.write_head(StatusCode::OK);
        }
        self.body.extend_from_slice(chunk);
    }
}
