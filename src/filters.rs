//! Stock filters.
//!
//! Two building blocks that cover the common ends of a pipeline: decorating
//! the response without answering, and answering unconditionally.

use bytes::Bytes;
use http::{HeaderName, HeaderValue, StatusCode};

use crate::filter::{BoxFuture, Filter};
use crate::request::Request;
use crate::response::ResponseWriter;

/// Sets one header and lets the request continue down the pipeline.
///
/// # Panics
///
/// Panics if `name` or `value` is not a valid header name or value.
pub fn set_header(name: &str, value: &str) -> SetHeader {
    let name = HeaderName::try_from(name)
        .unwrap_or_else(|e| panic!("invalid header name `{name}`: {e}"));
    let value = HeaderValue::try_from(value)
        .unwrap_or_else(|e| panic!("invalid header value `{value}`: {e}"));
    SetHeader { name, value }
}

/// Commits `status` and writes `body`, ending the pipeline.
pub fn respond(status: StatusCode, body: impl Into<Bytes>) -> Respond {
    Respond { status, body: body.into() }
}

/// Returned by [`set_header`].
#[derive(Clone, Debug)]
pub struct SetHeader {
    name: HeaderName,
    value: HeaderValue,
}

impl Filter for SetHeader {
    fn call<'a>(&'a self, res: &'a mut dyn ResponseWriter, _req: &'a Request) -> BoxFuture<'a> {
        res.headers_mut().insert(self.name.clone(), self.value.clone());
        Box::pin(std::future::ready(()))
    }
}

/// Returned by [`respond`].
#[derive(Clone, Debug)]
pub struct Respond {
    status: StatusCode,
    body: Bytes,
}

impl Filter for Respond {
    fn call<'a>(&'a self, res: &'a mut dyn ResponseWriter, _req: &'a Request) -> BoxFuture<'a> {
        res.write_head(self.status);
        if !self.body.is_empty() {
            res.write(&self.body);
        }
        Box::pin(std::future::ready(()))
    }
}
