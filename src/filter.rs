//! Filter trait and type erasure.
//!
//! # What a filter is
//!
//! A filter looks at a request and *may* answer it by writing to the
//! [`ResponseWriter`]. It never returns a response value: everything it does
//! is expressed as writes to the sink. Whether it answered is not something
//! the filter reports; the [`Pipeline`](crate::Pipeline) finds out by itself.
//!
//! The pipeline needs to hold filters of *different* types in one `Vec`, so
//! filters are stored as trait objects:
//!
//! ```text
//! filter_fn(|res, req| { … })          ← user writes this
//!        ↓
//! FilterFn(closure)                    ← newtype, implements Filter
//!        ↓ Pipeline::builder().filter(…)
//! Arc<dyn Filter>                      ← BoxedFilter, shared across requests
//!        ↓
//! filter.call(&mut observer, &req)     ← one vtable dispatch per slot
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::ResponseWriter;

/// A heap-allocated, type-erased future borrowed from one filter call.
///
/// The lifetime ties the future to the sink and request it was handed, so a
/// filter can hold `&mut dyn ResponseWriter` across `.await` points.
pub type BoxFuture<'a> = Pin<Box<dyn Future<Output = ()> + Send + 'a>>;

/// A type-erased filter shared across concurrent requests.
pub type BoxedFilter = Arc<dyn Filter>;

/// A unit of request handling that may or may not produce the response.
///
/// Implement this directly for async filters:
///
/// ```rust
/// use tsu_pipe::{BoxFuture, Filter, Request, ResponseWriter};
/// use http::StatusCode;
///
/// struct Teapot;
///
/// impl Filter for Teapot {
///     fn call<'a>(&'a self, res: &'a mut dyn ResponseWriter, req: &'a Request) -> BoxFuture<'a> {
///         Box::pin(async move {
///             if req.path() == "/coffee" {
///                 res.write_head(StatusCode::IM_A_TEAPOT);
///             }
///         })
///     }
/// }
/// ```
///
/// For plain synchronous logic, [`filter_fn`] is shorter.
pub trait Filter: Send + Sync + 'static {
    fn call<'a>(&'a self, res: &'a mut dyn ResponseWriter, req: &'a Request) -> BoxFuture<'a>;
}

impl<T: Filter + ?Sized> Filter for Arc<T> {
    fn call<'a>(&'a self, res: &'a mut dyn ResponseWriter, req: &'a Request) -> BoxFuture<'a> {
        (**self).call(res, req)
    }
}

/// Wraps a synchronous closure as a [`Filter`].
///
/// ```rust
/// use tsu_pipe::filter_fn;
///
/// let tag = filter_fn(|res, _req| {
///     res.headers_mut().insert("x-served-by", "tsu".parse().unwrap());
/// });
/// ```
pub fn filter_fn<F>(f: F) -> FilterFn<F>
where
    F: Fn(&mut dyn ResponseWriter, &Request) + Send + Sync + 'static,
{
    FilterFn(f)
}

/// Newtype returned by [`filter_fn`], bridging a closure to the trait-object world.
#[derive(Clone, Copy)]
pub struct FilterFn<F>(F);

impl<F> Filter for FilterFn<F>
where
    F: Fn(&mut dyn ResponseWriter, &Request) + Send + Sync + 'static,
{
    fn call<'a>(&'a self, res: &'a mut dyn ResponseWriter, req: &'a Request) -> BoxFuture<'a> {
        (self.0)(res, req);
        Box::pin(std::future::ready(()))
    }
}

/// Erases a filter's type so it can sit in a slot next to filters of other types.
///
/// ```rust
/// use tsu_pipe::{Pipeline, boxed, filter_fn};
///
/// let pipeline = Pipeline::new([
///     Some(boxed(filter_fn(|_res, _req| {}))),
///     None,
/// ]);
/// assert_eq!(pipeline.len(), 2);
/// ```
pub fn boxed<F: Filter>(filter: F) -> BoxedFilter {
    Arc::new(filter)
}
