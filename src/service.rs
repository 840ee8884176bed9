//! Bridges a [`Pipeline`] to a transport.
//!
//! The transport owns the listener and connections; this module only turns
//! one `http::Request` into one `http::Response`. The request body is read
//! in full, the pipeline runs against a fresh [`Recorder`], and the recorder
//! becomes the response.
//!
//! With hyper:
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use hyper_util::rt::{TokioExecutor, TokioIo};
//! use hyper_util::server::conn::auto::Builder;
//! use tsu_pipe::{Pipeline, PipelineService};
//!
//! # async fn serve(stream: tokio::net::TcpStream, pipeline: Arc<Pipeline>) {
//! let svc = PipelineService::new(pipeline);
//! Builder::new(TokioExecutor::new())
//!     .serve_connection(TokioIo::new(stream), svc)
//!     .await
//!     .ok();
//! # }
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http_body::Body;
use http_body_util::{BodyExt, Full};
use tracing::warn;

use crate::error::{BoxError, Error};
use crate::pipeline::Pipeline;
use crate::request::Request;
use crate::response::Recorder;

/// Runs `pipeline` for one transport-level request.
///
/// Fails only when the request body cannot be read; everything the pipeline
/// does ends up in the returned response.
pub async fn dispatch<B>(
    pipeline: &Pipeline,
    req: http::Request<B>,
) -> Result<http::Response<Full<Bytes>>, Error>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let (parts, body) = req.into_parts();
    let body = body.collect().await.map_err(Error::body)?.to_bytes();
    let req = Request::new(http::Request::from_parts(parts, body));

    let mut rec = Recorder::new();
    pipeline.handle(&mut rec, &req).await;
    Ok(rec.into_response())
}

/// A hyper [`Service`](hyper::service::Service) serving one shared pipeline.
///
/// Cloning is one `Arc` increment; every connection can hold its own copy.
#[derive(Clone, Debug)]
pub struct PipelineService {
    pipeline: Arc<Pipeline>,
}

impl PipelineService {
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &Arc<Pipeline> {
        &self.pipeline
    }
}

impl<B> hyper::service::Service<http::Request<B>> for PipelineService
where
    B: Body + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError>,
{
    type Response = http::Response<Full<Bytes>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<B>) -> Self::Future {
        let pipeline = Arc::clone(&self.pipeline);
        Box::pin(async move {
            let res = dispatch(&pipeline, req).await;
            if let Err(e) = &res {
                warn!("dropping request: {e}");
            }
            res
        })
    }
}
