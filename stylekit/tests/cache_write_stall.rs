//! A cache write that never completes must not hold up the session.
//!
//! Lives in its own test binary: the locator numbers temp files with a
//! process-wide sequence, so the first write of this process is the one
//! stalled here.

#![cfg(unix)]

use futures::future::BoxFuture;
use std::path::PathBuf;
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;
use stylekit::config::SessionConfig;
use stylekit::locator::cache_path;
use stylekit::pipeline::HeadlessBackend;
use stylekit::session::{SessionOutcome, StyleSession};
use stylekit::transport::{Transport, TransportError};
use stylekit::view::Presentation;

const STYLE_URL: &str = "https://tiles.example.com/style.json";

const STYLE_INLINE: &str = r#"{
    "version": 8,
    "sources": {"a": {"type": "vector", "tiles": ["https://tiles.example.com/a/{z}/{x}/{y}.pbf"], "minzoom": 0, "maxzoom": 14}},
    "layers": [{"id": "roads", "type": "line", "source": "a", "source-layer": "transportation"}]
}"#;

struct StyleOnlyTransport;

impl Transport for StyleOnlyTransport {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Vec<u8>, TransportError>> {
        Box::pin(async move {
            if url == STYLE_URL {
                Ok(STYLE_INLINE.as_bytes().to_vec())
            } else {
                Err(TransportError::Http(format!("HTTP 404 from {}", url)))
            }
        })
    }
}

/// Temp file the first cache write of this process opens.
fn first_temp_path(cache: &std::path::Path) -> PathBuf {
    let entry = cache_path(cache, STYLE_URL);
    let mut name = entry.file_name().unwrap().to_os_string();
    name.push(format!(".{}.0.tmp", std::process::id()));
    entry.with_file_name(name)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_stalled_cache_write_blocks_neither_readiness_nor_stop() {
    let cache = tempfile::TempDir::new().unwrap();

    // Opening a FIFO for writing blocks until a reader shows up.
    let fifo = first_temp_path(cache.path());
    let status = Command::new("mkfifo").arg(&fifo).status().unwrap();
    assert!(status.success());

    let headless = Arc::new(HeadlessBackend::new(Presentation::Flat));
    let config = SessionConfig::new()
        .with_style_url(STYLE_URL)
        .with_cache_root(cache.path());
    let mut session = StyleSession::new(config, Arc::new(StyleOnlyTransport), headless.backend());

    session.start().await.unwrap();
    let outcome = tokio::time::timeout(Duration::from_secs(2), session.wait_for_outcome()).await;
    let stopped = tokio::time::timeout(Duration::from_secs(2), session.stop()).await;
    let detached = headless.attached().is_empty();

    // Unblock the writer so the runtime can shut down.
    let reader = std::thread::spawn(move || std::fs::read(&fifo));
    let written = reader.join().unwrap().unwrap();

    assert!(matches!(outcome, Ok(SessionOutcome::Attached(_))), "{:?}", outcome);
    assert!(stopped.is_ok(), "stop() waited on the cache write");
    assert!(detached);
    assert_eq!(written, STYLE_INLINE.as_bytes().to_vec());
}
