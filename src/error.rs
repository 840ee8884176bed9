//! Unified error type.

use std::fmt;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The error type returned by tsu-pipe's fallible operations.
///
/// Pipelines and filters have no error channel: a filter answers through the
/// [`ResponseWriter`](crate::ResponseWriter) or not at all. This type surfaces
/// the one infrastructure failure left, reading the request body off the
/// transport before the pipeline runs.
#[derive(Debug)]
pub struct Error(BoxError);

impl Error {
    pub(crate) fn body(e: impl Into<BoxError>) -> Self {
        Self(e.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "request body: {}", self.0)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.0)
    }
}
