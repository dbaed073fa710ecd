//! Local file transport.

use super::types::{Transport, TransportError};
use futures::future::BoxFuture;
use std::path::PathBuf;
use tracing::trace;
use url::Url;

/// Returns true if `url` names a resource on the local filesystem.
///
/// `file://` URLs and anything that does not parse as an absolute URL
/// (bare paths such as `/var/cache/style.json` or `styles/base.json`)
/// are local. Single-letter schemes are Windows drive letters, not URLs.
pub fn is_local_url(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => parsed.scheme() == "file" || parsed.scheme().len() == 1,
        Err(_) => true,
    }
}

/// Converts a local URL into a filesystem path.
///
/// Returns `None` for remote URLs or `file://` URLs that cannot be mapped
/// onto a path on this platform.
pub fn local_path(url: &str) -> Option<PathBuf> {
    match Url::parse(url) {
        Ok(parsed) if parsed.scheme() == "file" => parsed.to_file_path().ok(),
        Ok(parsed) if parsed.scheme().len() == 1 => Some(PathBuf::from(url)),
        Ok(_) => None,
        Err(_) => Some(PathBuf::from(url)),
    }
}

/// Transport reading resources from the local filesystem.
///
/// Used for `file://` styles and for cache hits produced by the
/// [`ResourceLocator`](crate::locator::ResourceLocator).
#[derive(Debug, Clone, Copy, Default)]
pub struct FileTransport;

impl FileTransport {
    /// Creates a new file transport.
    pub fn new() -> Self {
        Self
    }
}

impl Transport for FileTransport {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Vec<u8>, TransportError>> {
        Box::pin(async move {
            let path = local_path(url)
                .ok_or_else(|| TransportError::Io(format!("Not a local resource: {}", url)))?;

            let data = tokio::fs::read(&path)
                .await
                .map_err(|e| TransportError::Io(format!("{}: {}", path.display(), e)))?;

            trace!(path = %path.display(), bytes = data.len(), "Local resource read");
            Ok(data)
        })
    }
}
