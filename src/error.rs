//! Unified error type.

use std::fmt;

/// Boxed, thread-safe error produced by a request body.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error type returned by mw's fallible operations.
///
/// Composing handlers never fails, and application-level errors (404, 422,
/// etc.) are expressed as HTTP [`Response`](crate::Response) values. This
/// type only surfaces a request body that could not be read to completion
/// while converting from an `http::Request`.
#[derive(Debug)]
pub struct Error(BoxError);

impl Error {
    pub(crate) fn body(e: impl Into<BoxError>) -> Self {
        Self(e.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "body: {}", self.0)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.0)
    }
}
