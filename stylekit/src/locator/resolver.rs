//! URL override and cache resolution.

use super::path::cache_path;
use crate::transport::is_local_url;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace, warn};
use url::Url;

/// Caller-supplied URL rewrite hook, applied before any cache lookup.
pub type FileOverride = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Sequence for temporary file names, so concurrent writers of the same
/// cache entry never share a temp file.
static TEMP_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Where a fetch should actually read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchTarget {
    /// A network URL (after the override hook)
    Remote(String),
    /// A resource that was already local before caching was considered
    Local(String),
    /// A cached copy of a remote resource
    Cached(PathBuf),
}

impl FetchTarget {
    /// The location string handed to the transport.
    pub fn location(&self) -> String {
        match self {
            Self::Remote(url) | Self::Local(url) => url.clone(),
            Self::Cached(path) => path.to_string_lossy().into_owned(),
        }
    }

    /// Returns true if this target is served from the cache.
    pub fn is_cache_hit(&self) -> bool {
        matches!(self, Self::Cached(_))
    }
}

impl fmt::Display for FetchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(url) => write!(f, "remote {}", url),
            Self::Local(url) => write!(f, "local {}", url),
            Self::Cached(path) => write!(f, "cached {}", path.display()),
        }
    }
}

/// Resolves logical resource URLs to concrete fetch targets and persists
/// fetched bytes to the cache.
///
/// Cheap to clone; clones share the override hook.
#[derive(Clone)]
pub struct ResourceLocator {
    cache_root: Option<PathBuf>,
    file_override: Option<FileOverride>,
}

impl ResourceLocator {
    /// Creates a locator with an optional cache root and no override.
    pub fn new(cache_root: Option<PathBuf>) -> Self {
        Self {
            cache_root,
            file_override: None,
        }
    }

    /// Sets the URL rewrite hook.
    pub fn with_override(mut self, file_override: FileOverride) -> Self {
        self.file_override = Some(file_override);
        self
    }

    /// Returns the configured cache root, if any.
    pub fn cache_root(&self) -> Option<&Path> {
        self.cache_root.as_deref()
    }

    /// Applies the override hook (identity when none is configured).
    pub fn rewrite(&self, url: &str) -> String {
        match &self.file_override {
            Some(hook) => hook(url),
            None => url.to_string(),
        }
    }

    /// Resolves a logical URL to the target a fetch should read from.
    ///
    /// The override hook runs first. If a cache root is configured, the
    /// rewritten URL is remote and a cached copy exists, the cached copy
    /// wins. Resolution has no side effects, so resolving the same URL twice
    /// against an unchanged cache gives the same answer.
    pub async fn resolve_for_fetch(&self, url: &str) -> FetchTarget {
        let rewritten = self.rewrite(url);

        if is_local_url(&rewritten) {
            trace!(url = url, target = %rewritten, "Resource is local");
            return FetchTarget::Local(rewritten);
        }

        if let Some(path) = self.cache_path_for(&rewritten) {
            let is_file = tokio::fs::metadata(&path)
                .await
                .map(|m| m.is_file())
                .unwrap_or(false);
            if is_file {
                debug!(url = url, path = %path.display(), "Cache hit");
                return FetchTarget::Cached(path);
            }
        }

        FetchTarget::Remote(rewritten)
    }

    /// Returns the cache path for a URL.
    ///
    /// Returns `None` when no cache root is configured or the URL (after the
    /// override hook) is already local.
    pub fn cache_path(&self, url: &str) -> Option<PathBuf> {
        let rewritten = self.rewrite(url);
        if is_local_url(&rewritten) {
            return None;
        }
        self.cache_path_for(&rewritten)
    }

    /// Persists fetched bytes for `url` in the cache, creating the cache
    /// root on first use.
    ///
    /// No-op without a cache root or for local resources. Failures are
    /// logged and swallowed: caching never fails a fetch.
    pub async fn write_to_cache(&self, url: &str, data: &[u8]) {
        let Some(path) = self.cache_path(url) else {
            return;
        };

        if let Some(root) = path.parent() {
            // create_dir_all succeeds if another writer created the root first
            if let Err(e) = tokio::fs::create_dir_all(root).await {
                warn!(root = %root.display(), error = %e, "Failed to create cache root");
                return;
            }
        }

        match write_atomic(&path, data).await {
            Ok(()) => debug!(url = url, path = %path.display(), bytes = data.len(), "Cached resource"),
            Err(e) => warn!(url = url, path = %path.display(), error = %e, "Cache write failed"),
        }
    }

    /// Stores `data` for `url` on a background task and returns at once.
    pub fn spawn_cache_write(&self, url: &str, data: Vec<u8>) {
        if self.cache_path(url).is_none() {
            return;
        }

        let locator = self.clone();
        let url = url.to_string();
        tokio::spawn(async move {
            locator.write_to_cache(&url, &data).await;
        });
    }

    fn cache_path_for(&self, rewritten: &str) -> Option<PathBuf> {
        let root = self.cache_root.as_deref()?;
        Some(cache_path(root, rewritten))
    }
}

/// Resolves a URL found inside a document against the document's URL.
///
/// Absolute URLs pass through unchanged. Relative references are joined
/// like a browser would against a URL base, or against the directory of a
/// bare-path base.
pub fn join_reference(base: &str, reference: &str) -> String {
    if Url::parse(reference).is_ok() {
        return reference.to_string();
    }

    match Url::parse(base) {
        Ok(base_url) if base_url.scheme().len() > 1 => match base_url.join(reference) {
            Ok(joined) => joined.to_string(),
            Err(_) => reference.to_string(),
        },
        _ => {
            let reference_path = Path::new(reference);
            if reference_path.is_absolute() {
                return reference.to_string();
            }
            match Path::new(base).parent() {
                Some(dir) => dir.join(reference_path).to_string_lossy().into_owned(),
                None => reference.to_string(),
            }
        }
    }
}

impl fmt::Debug for ResourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceLocator")
            .field("cache_root", &self.cache_root)
            .field("file_override", &self.file_override.is_some())
            .finish()
    }
}

/// Write via a unique temp file and rename, so readers never observe a
/// partially written entry. Concurrent writers: last rename wins.
async fn write_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let sequence = TEMP_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(format!(".{}.{}.tmp", std::process::id(), sequence));
    let temp_path = path.with_file_name(temp_name);

    tokio::fs::write(&temp_path, data).await?;
    if let Err(e) = tokio::fs::rename(&temp_path, path).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const STYLE_URL: &str = "https://tiles.example.com/style.json";

    #[test]
    fn test_join_reference() {
        assert_eq!(
            join_reference(STYLE_URL, "https://cdn.example.net/a.json"),
            "https://cdn.example.net/a.json"
        );
        assert_eq!(
            join_reference(STYLE_URL, "sources/a.json"),
            "https://tiles.example.com/sources/a.json"
        );
        assert_eq!(
            join_reference("https://tiles.example.com/v1/style.json?key=k", "/sprites/base"),
            "https://tiles.example.com/sprites/base"
        );
        assert_eq!(
            join_reference("file:///styles/base/style.json", "tiles.json"),
            "file:///styles/base/tiles.json"
        );
        assert_eq!(join_reference("/styles/style.json", "tiles.json"), "/styles/tiles.json");
        assert_eq!(join_reference("/styles/style.json", "/data/tiles.json"), "/data/tiles.json");
        assert_eq!(
            join_reference("/styles/style.json", "mapbox://mapbox.streets"),
            "mapbox://mapbox.streets"
        );
    }

    #[tokio::test]
    async fn test_no_cache_root_returns_rewritten_url() {
        let locator = ResourceLocator::new(None);
        assert_eq!(
            locator.resolve_for_fetch(STYLE_URL).await,
            FetchTarget::Remote(STYLE_URL.to_string())
        );
        assert!(locator.cache_path(STYLE_URL).is_none());
    }

    #[tokio::test]
    async fn test_override_applied_before_cache() {
        let locator = ResourceLocator::new(None).with_override(Arc::new(|url: &str| {
            url.replace("https://tiles.example.com", "https://mirror.example.net")
        }));

        assert_eq!(
            locator.resolve_for_fetch(STYLE_URL).await,
            FetchTarget::Remote("https://mirror.example.net/style.json".to_string())
        );
    }

    #[tokio::test]
    async fn test_cache_miss_returns_remote() {
        let dir = TempDir::new().unwrap();
        let locator = ResourceLocator::new(Some(dir.path().to_path_buf()));

        assert_eq!(
            locator.resolve_for_fetch(STYLE_URL).await,
            FetchTarget::Remote(STYLE_URL.to_string())
        );
    }

    #[tokio::test]
    async fn test_cache_hit_returns_cache_path() {
        let dir = TempDir::new().unwrap();
        let locator = ResourceLocator::new(Some(dir.path().to_path_buf()));
        let path = locator.cache_path(STYLE_URL).unwrap();
        std::fs::write(&path, b"{}").unwrap();

        let target = locator.resolve_for_fetch(STYLE_URL).await;
        assert_eq!(target, FetchTarget::Cached(path));
        assert!(target.is_cache_hit());
    }

    #[tokio::test]
    async fn test_resolve_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let locator = ResourceLocator::new(Some(dir.path().to_path_buf()));

        assert_eq!(
            locator.resolve_for_fetch(STYLE_URL).await,
            locator.resolve_for_fetch(STYLE_URL).await
        );

        std::fs::write(locator.cache_path(STYLE_URL).unwrap(), b"{}").unwrap();
        assert_eq!(
            locator.resolve_for_fetch(STYLE_URL).await,
            locator.resolve_for_fetch(STYLE_URL).await
        );
    }

    #[tokio::test]
    async fn test_local_resources_never_get_cache_paths() {
        let dir = TempDir::new().unwrap();
        let locator = ResourceLocator::new(Some(dir.path().to_path_buf()));

        assert_eq!(
            locator.resolve_for_fetch("/styles/local.json").await,
            FetchTarget::Local("/styles/local.json".to_string())
        );
        assert!(locator.cache_path("file:///styles/local.json").is_none());
    }

    #[tokio::test]
    async fn test_cache_root_created_on_first_write() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("nested").join("cache");
        let locator = ResourceLocator::new(Some(root.clone()));

        assert!(locator.cache_path(STYLE_URL).is_some());
        assert_eq!(
            locator.resolve_for_fetch(STYLE_URL).await,
            FetchTarget::Remote(STYLE_URL.to_string())
        );
        assert!(!root.exists());

        locator.write_to_cache(STYLE_URL, b"{}").await;
        assert!(root.is_dir());
        assert!(locator.resolve_for_fetch(STYLE_URL).await.is_cache_hit());
    }

    #[tokio::test]
    async fn test_spawned_write_lands_in_cache() {
        let dir = TempDir::new().unwrap();
        let locator = ResourceLocator::new(Some(dir.path().to_path_buf()));

        locator.spawn_cache_write(STYLE_URL, b"spawned".to_vec());

        let path = locator.cache_path(STYLE_URL).unwrap();
        for _ in 0..200 {
            if path.is_file() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        assert_eq!(std::fs::read(path).unwrap(), b"spawned".to_vec());
    }

    #[tokio::test]
    async fn test_write_to_cache_round_trips_through_resolve() {
        let dir = TempDir::new().unwrap();
        let locator = ResourceLocator::new(Some(dir.path().to_path_buf()));

        locator.write_to_cache(STYLE_URL, b"first").await;
        locator.write_to_cache(STYLE_URL, b"second").await;

        let target = locator.resolve_for_fetch(STYLE_URL).await;
        let FetchTarget::Cached(path) = target else {
            panic!("expected cache hit, got {:?}", target);
        };
        assert_eq!(std::fs::read(path).unwrap(), b"second".to_vec());
    }

    #[tokio::test]
    async fn test_write_without_cache_root_is_noop() {
        let locator = ResourceLocator::new(None);
        locator.write_to_cache(STYLE_URL, b"data").await;
    }

    #[tokio::test]
    async fn test_write_failure_is_swallowed() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();

        // Cache root is a regular file, so every write fails
        let locator = ResourceLocator::new(Some(blocker));
        locator.write_to_cache(STYLE_URL, b"data").await;
    }

    #[tokio::test]
    async fn test_concurrent_writers_leave_one_complete_entry() {
        let dir = TempDir::new().unwrap();
        let locator = ResourceLocator::new(Some(dir.path().to_path_buf()));

        let writers: Vec<_> = (0..8u8)
            .map(|i| {
                let locator = locator.clone();
                tokio::spawn(async move {
                    locator.write_to_cache(STYLE_URL, &[i; 64]).await;
                })
            })
            .collect();
        for writer in writers {
            writer.await.unwrap();
        }

        let data = std::fs::read(locator.cache_path(STYLE_URL).unwrap()).unwrap();
        assert_eq!(data.len(), 64);
        assert!(data.iter().all(|b| *b == data[0]));

        let leftovers = std::fs::read_dir(dir.path())
            .unwrap()
            .filter(|e| {
                e.as_ref()
                    .map(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
                    .unwrap_or(false)
            })
            .count();
        assert_eq!(leftovers, 0);
    }
}
