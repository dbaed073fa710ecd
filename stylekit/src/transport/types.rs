//! Transport trait and error type.

use futures::future::BoxFuture;
use thiserror::Error;

/// Errors that can occur while fetching a resource.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The HTTP request failed or returned a non-success status
    #[error("HTTP error: {0}")]
    Http(String),

    /// Reading a local resource failed
    #[error("I/O error: {0}")]
    Io(String),

    /// The request completed but carried no body
    #[error("Empty response body from {0}")]
    EmptyBody(String),

    /// The fetch was canceled before it completed
    #[error("Fetch canceled")]
    Canceled,
}

/// Asynchronous, cancelable retrieval of a single resource.
///
/// Cancellation is driven by the caller dropping the returned future, so
/// implementations only need to be cancel-safe in the usual async sense.
/// Implementations must be `Send + Sync` because one transport is shared by
/// every fetch task of a session.
pub trait Transport: Send + Sync {
    /// Fetches the resource at `url` and returns its raw bytes.
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Vec<u8>, TransportError>>;
}
