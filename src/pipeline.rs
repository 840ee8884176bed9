//! Short-circuiting filter pipeline.
//!
//! A [`Pipeline`] runs its filters in insertion order until one of them
//! commits the response. Nobody tells the pipeline that a filter responded:
//! each request gets a fresh [`ResponseObserver`] around the real sink, and
//! the pipeline checks it after every filter. The first filter that commits
//! ends the request. If none does, the fallback answers on the original sink.
//!
//! ```text
//! slot 0 ──► observer.responded()? ── yes ──► return
//!              │ no
//! slot 1 (None) ─ skipped
//!              │
//! slot 2 ──► observer.responded()? ── yes ──► return
//!              │ no
//! fallback(original sink)
//! ```

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;
use http::StatusCode;
use tracing::{debug, trace};

use crate::filter::{BoxFuture, BoxedFilter, Filter, boxed, filter_fn};
use crate::observer::ResponseObserver;
use crate::request::Request;
use crate::response::ResponseWriter;

/// Body written by the default fallback when no filter responded.
pub const DEFAULT_FALLBACK_BODY: &[u8] = b":(";

/// An ordered list of filter slots plus one fallback.
///
/// Slots hold `Option<BoxedFilter>`; `None` is a placeholder that is skipped.
/// The same filter may sit in several slots.
///
/// The fallback lives behind an [`ArcSwap`], so [`set_fallback`](Pipeline::set_fallback)
/// works through a shared `&Pipeline` while requests are being served. Each
/// request loads the fallback once, on entry; swapping it never affects a
/// request already in flight.
///
/// `Pipeline` is itself a [`Filter`], so pipelines nest.
pub struct Pipeline {
    filters: Vec<Option<BoxedFilter>>,
    fallback: ArcSwap<BoxedFilter>,
}

impl Pipeline {
    /// Creates a pipeline from filter slots, with the default fallback.
    ///
    /// An empty list is fine: every request then goes to the fallback.
    pub fn new(filters: impl IntoIterator<Item = Option<BoxedFilter>>) -> Self {
        Self {
            filters: filters.into_iter().collect(),
            fallback: ArcSwap::from_pointee(default_fallback()),
        }
    }

    /// Fluent construction, one slot at a time.
    ///
    /// ```rust
    /// use tsu_pipe::{Pipeline, filter_fn, filters};
    /// use http::StatusCode;
    ///
    /// let pipeline = Pipeline::builder()
    ///     .filter(filters::set_header("x-a", "1"))
    ///     .skip()
    ///     .filter(filters::respond(StatusCode::OK, "OK"))
    ///     .fallback(filter_fn(|res, _req| res.write_head(StatusCode::NOT_FOUND)))
    ///     .build();
    ///
    /// assert_eq!(pipeline.len(), 3);
    /// ```
    pub fn builder() -> Builder {
        Builder { filters: Vec::new(), fallback: None }
    }

    /// Replaces the fallback. Takes effect from the next request that starts.
    pub fn set_fallback(&self, fallback: impl Filter) {
        self.fallback.store(Arc::new(boxed(fallback)));
    }

    /// Reinstalls the built-in `500` fallback.
    pub fn reset_fallback(&self) {
        self.fallback.store(Arc::new(default_fallback()));
    }

    /// Number of slots, placeholders included.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Runs the pipeline for one request.
    ///
    /// Filter panics and cancellation are not intercepted: they reach the
    /// caller exactly as the filter produced them.
    pub async fn handle(&self, res: &mut dyn ResponseWriter, req: &Request) {
        let fallback = self.fallback.load_full();
        let pending = res.headers().clone();

        let mut observer = ResponseObserver::new(&mut *res);
        for (index, slot) in self.filters.iter().enumerate() {
            let Some(filter) = slot else {
                trace!(index, "skipping empty filter slot");
                continue;
            };

            filter.call(&mut observer, req).await;
            if observer.responded() {
                debug!(index, path = req.path(), "filter responded");
                return;
            }
        }

        // Headers set by filters that did not respond must not leak into the
        // fallback's response.
        *res.headers_mut() = pending;

        debug!(slots = self.filters.len(), path = req.path(), "no filter responded, running fallback");
        fallback.call(res, req).await;
    }
}

impl Filter for Pipeline {
    fn call<'a>(&'a self, res: &'a mut dyn ResponseWriter, req: &'a Request) -> BoxFuture<'a> {
        Box::pin(self.handle(res, req))
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let placeholders = self.filters.iter().filter(|slot| slot.is_none()).count();
        f.debug_struct("Pipeline")
            .field("slots", &self.filters.len())
            .field("placeholders", &placeholders)
            .finish_non_exhaustive()
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

/// Fluent builder for [`Pipeline`].
///
/// Obtain via [`Pipeline::builder()`]. Slots run in the order they were added.
pub struct Builder {
    filters: Vec<Option<BoxedFilter>>,
    fallback: Option<BoxedFilter>,
}

impl Builder {
    pub fn filter(mut self, filter: impl Filter) -> Self {
        self.filters.push(Some(boxed(filter)));
        self
    }

    /// Appends an empty placeholder slot.
    pub fn skip(mut self) -> Self {
        self.filters.push(None);
        self
    }

    /// Overrides the built-in `500` fallback.
    pub fn fallback(mut self, fallback: impl Filter) -> Self {
        self.fallback = Some(boxed(fallback));
        self
    }

    pub fn build(self) -> Pipeline {
        Pipeline {
            filters: self.filters,
            fallback: ArcSwap::from_pointee(self.fallback.unwrap_or_else(default_fallback)),
        }
    }
}

// ── Default fallback ──────────────────────────────────────────────────────────

/// `500 Internal Server Error` with body `:(`, meaning "no filter produced a result".
fn default_fallback() -> BoxedFilter {
    boxed(filter_fn(|res, _req| {
        res.write_head(StatusCode::INTERNAL_SERVER_ERROR);
        res.write(DEFAULT_FALLBACK_BODY);
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use bytes::Bytes;

    use super::*;
    use crate::filters;
    use crate::response::Recorder;

    fn request() -> Request {
        Request::new(http::Request::builder().uri("/").body(Bytes::new()).unwrap())
    }

    async fn run(pipeline: &Pipeline) -> Recorder {
        let mut rec = Recorder::new();
        pipeline.handle(&mut rec, &request()).await;
        rec
    }

    /// A filter that counts its invocations and never responds.
    fn counting(hits: Arc<AtomicUsize>) -> impl Filter {
        filter_fn(move |_res, _req| {
            hits.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test]
    async fn empty_pipeline_runs_default_fallback() {
        let rec = run(&Pipeline::default()).await;

        assert_eq!(rec.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        assert_eq!(rec.body(), DEFAULT_FALLBACK_BODY);
    }

    #[tokio::test]
    async fn first_responder_stops_the_pipeline() {
        let before = Arc::new(AtomicUsize::new(0));
        let after = Arc::new(AtomicUsize::new(0));
        let fallback = Arc::new(AtomicUsize::new(0));

        let pipeline = Pipeline::builder()
            .filter(counting(Arc::clone(&before)))
            .filter(filters::respond(StatusCode::OK, "OK"))
            .filter(counting(Arc::clone(&after)))
            .filter(filters::respond(StatusCode::IM_A_TEAPOT, "late"))
            .fallback(counting(Arc::clone(&fallback)))
            .build();

        let rec = run(&pipeline).await;

        assert_eq!(rec.status(), Some(StatusCode::OK));
        assert_eq!(rec.body(), b"OK");
        assert_eq!(before.load(Ordering::SeqCst), 1);
        assert_eq!(after.load(Ordering::SeqCst), 0);
        assert_eq!(fallback.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn placeholders_do_not_count_as_invocations() {
        let hits = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::new([
            None,
            Some(boxed(counting(Arc::clone(&hits)))),
            None,
            Some(boxed(counting(Arc::clone(&hits)))),
        ]);

        run(&pipeline).await;
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn same_filter_in_two_slots_runs_twice() {
        let hits = Arc::new(AtomicUsize::new(0));
        let shared = boxed(counting(Arc::clone(&hits)));
        let pipeline = Pipeline::new([Some(Arc::clone(&shared)), Some(shared)]);

        run(&pipeline).await;
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn fallback_does_not_see_headers_of_silent_filters() {
        let pipeline = Pipeline::builder()
            .filter(filters::set_header("a", "1"))
            .build();

        let rec = run(&pipeline).await;

        assert_eq!(rec.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(rec.committed_headers().unwrap().get("a").is_none());
    }

    #[tokio::test]
    async fn bare_body_write_short_circuits() {
        let after = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::builder()
            .filter(filter_fn(|res, _req| res.write(b"streamed")))
            .filter(counting(Arc::clone(&after)))
            .build();

        let rec = run(&pipeline).await;

        assert_eq!(rec.status(), Some(StatusCode::OK));
        assert_eq!(rec.body(), b"streamed");
        assert_eq!(after.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn reset_fallback_restores_default() {
        let pipeline = Pipeline::default();
        pipeline.set_fallback(filters::respond(StatusCode::NOT_FOUND, "nope"));
        assert_eq!(run(&pipeline).await.status(), Some(StatusCode::NOT_FOUND));

        pipeline.reset_fallback();
        assert_eq!(run(&pipeline).await.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[test]
    fn debug_counts_placeholders() {
        let pipeline = Pipeline::builder().skip().filter(filters::set_header("a", "1")).build();
        let debug = format!("{pipeline:?}");
        assert!(debug.contains("slots: 2"));
        assert!(debug.contains("placeholders: 1"));
    }
}
