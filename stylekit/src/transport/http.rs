//! HTTP transport built on reqwest.

use super::file::{is_local_url, FileTransport};
use super::types::{Transport, TransportError};
use futures::future::BoxFuture;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Default User-Agent string for style and tile metadata requests.
const DEFAULT_USER_AGENT: &str = concat!("stylekit/", env!("CARGO_PKG_VERSION"));

/// Default request timeout in seconds.
///
/// The session imposes no timeouts of its own; it relies on this one.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Async HTTP transport using reqwest.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a new transport with the default timeout.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    /// Creates a new transport with a custom timeout.
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(DEFAULT_USER_AGENT)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| TransportError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Vec<u8>, TransportError>> {
        Box::pin(async move {
            trace!(url = url, "HTTP GET request starting");

            let response = match self.client.get(url).send().await {
                Ok(resp) => {
                    debug!(
                        url = url,
                        status = resp.status().as_u16(),
                        "HTTP response received"
                    );
                    resp
                }
                Err(e) => {
                    warn!(
                        url = url,
                        error = %e,
                        is_connect = e.is_connect(),
                        is_timeout = e.is_timeout(),
                        "HTTP request failed"
                    );
                    return Err(TransportError::Http(format!("Request failed: {}", e)));
                }
            };

            if !response.status().is_success() {
                warn!(
                    url = url,
                    status = response.status().as_u16(),
                    "HTTP error status"
                );
                return Err(TransportError::Http(format!(
                    "HTTP {} from {}",
                    response.status(),
                    url
                )));
            }

            let bytes = response.bytes().await.map_err(|e| {
                warn!(url = url, error = %e, "Failed to read response body");
                TransportError::Http(format!("Failed to read response: {}", e))
            })?;

            if bytes.is_empty() {
                return Err(TransportError::EmptyBody(url.to_string()));
            }

            trace!(url = url, bytes = bytes.len(), "HTTP response body read");
            Ok(bytes.to_vec())
        })
    }
}

/// Transport that routes local URLs to [`FileTransport`] and everything
/// else to [`HttpTransport`].
///
/// This is the transport the CLI uses: cache hits resolve to local paths
/// while uncached resources go over the network.
#[derive(Clone)]
pub struct StandardTransport {
    http: HttpTransport,
    file: FileTransport,
}

impl StandardTransport {
    /// Creates a routing transport with the default HTTP timeout.
    pub fn new() -> Result<Self, TransportError> {
        Ok(Self::with_http(HttpTransport::new()?))
    }

    /// Creates a routing transport around an existing HTTP transport.
    pub fn with_http(http: HttpTransport) -> Self {
        Self {
            http,
            file: FileTransport::new(),
        }
    }
}

impl Transport for StandardTransport {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Vec<u8>, TransportError>> {
        if is_local_url(url) {
            self.file.fetch(url)
        } else {
            self.http.fetch(url)
        }
    }
}
