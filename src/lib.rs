//! # tsu-pipe
//!
//! Run a list of HTTP filters until one of them answers.
//!
//! ## The contract
//!
//! A [`Filter`] gets the request and a [`ResponseWriter`]. It may set
//! headers and move on, or it may commit a response. It never says which it
//! did. The [`Pipeline`] watches the sink through a [`ResponseObserver`] and
//! stops at the first filter that committed. If nobody did, the fallback
//! answers, by default with `500` and the body `:(`.
//!
//! What tsu-pipe does not do:
//!
//! - **Listening, TLS, connections** belong to the transport (hyper, nginx, …)
//! - **Routing by path** belongs to a router in front of or inside a filter
//! - **Error translation**: a panicking filter panics through the pipeline
//!
//! ## Quick start
//!
//! ```rust
//! use bytes::Bytes;
//! use http::StatusCode;
//! use tsu_pipe::{Pipeline, Recorder, Request, ResponseWriter, filter_fn, filters};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let app = Pipeline::builder()
//!     .filter(filters::set_header("x-served-by", "tsu"))
//!     .filter(filter_fn(|res, req| {
//!         if req.header("authorization").is_none() {
//!             res.write_head(StatusCode::UNAUTHORIZED);
//!         }
//!     }))
//!     .filter(filters::respond(StatusCode::OK, "OK"))
//!     .build();
//!
//! let req = Request::new(http::Request::get("/").body(Bytes::new()).unwrap());
//! let mut res = Recorder::new();
//! app.handle(&mut res, &req).await;
//!
//! assert_eq!(res.status(), Some(StatusCode::UNAUTHORIZED));
//! # }
//! ```

mod error;
mod filter;
mod observer;
mod pipeline;
mod request;
mod response;
mod service;

pub mod filters;

pub use error::Error;
pub use filter::{BoxFuture, BoxedFilter, Filter, FilterFn, boxed, filter_fn};
pub use observer::ResponseObserver;
pub use pipeline::{Builder, DEFAULT_FALLBACK_BODY, Pipeline};
pub use request::Request;
pub use response::{Recorder, ResponseWriter};
pub use service::{PipelineService, dispatch};
