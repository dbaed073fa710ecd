//! Outstanding fetch bookkeeping and fetch tasks.

use super::handle::{FetchHandle, FetchId, FetchPurpose, FetchStatus};
use super::join::FetchJoin;
use crate::locator::FetchTarget;
use crate::transport::{Transport, TransportError};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Message sent by a fetch task when it finishes.
#[derive(Debug)]
pub struct FetchCompletion {
    pub id: FetchId,
    pub result: Result<Vec<u8>, TransportError>,
}

/// The fetches of one session run.
///
/// Every issued fetch is counted by the [`FetchJoin`] and settled exactly
/// once, either by its completion or by [`cancel_all`](Self::cancel_all).
pub struct FetchSet {
    transport: Arc<dyn Transport>,
    completion_tx: mpsc::UnboundedSender<FetchCompletion>,
    parent: CancellationToken,
    handles: Vec<FetchHandle>,
    join: FetchJoin,
    next_id: u64,
}

impl FetchSet {
    /// Fetch tasks report to `completion_tx` and are cancelled along with
    /// `parent`.
    pub fn new(
        transport: Arc<dyn Transport>,
        completion_tx: mpsc::UnboundedSender<FetchCompletion>,
        parent: CancellationToken,
    ) -> Self {
        Self {
            transport,
            completion_tx,
            parent,
            handles: Vec::new(),
            join: FetchJoin::new(),
            next_id: 0,
        }
    }

    /// Registers a fetch and spawns its task.
    pub fn issue(&mut self, purpose: FetchPurpose, url: &str, target: FetchTarget) -> FetchId {
        self.next_id += 1;
        let id = FetchId(self.next_id);
        let token = self.parent.child_token();

        debug!(
            fetch_id = %id,
            purpose = %purpose,
            url = url,
            target = %target,
            "Issuing fetch"
        );

        spawn_fetch(
            id,
            target.location(),
            Arc::clone(&self.transport),
            token.clone(),
            self.completion_tx.clone(),
        );

        self.handles
            .push(FetchHandle::new(id, purpose, url.to_string(), target, token));
        self.join.add();
        id
    }

    /// Marks a pending fetch terminal and counts it down.
    ///
    /// Returns `None` for unknown or already-settled fetches, so a late
    /// completion of a cancelled fetch is ignored.
    pub fn settle(&mut self, id: FetchId, status: FetchStatus) -> Option<&FetchHandle> {
        let handle = self
            .handles
            .iter_mut()
            .find(|h| h.id() == id && h.is_pending())?;
        handle.set_status(status);
        self.join.done();
        Some(handle)
    }

    /// Cancels every pending fetch. Returns how many were cancelled.
    pub fn cancel_all(&mut self) -> usize {
        let mut canceled = 0;
        for handle in self.handles.iter_mut().filter(|h| h.is_pending()) {
            handle.cancel();
            self.join.done();
            canceled += 1;
        }
        if canceled > 0 {
            debug!(canceled, "Canceled outstanding fetches");
        }
        canceled
    }

    pub fn get(&self, id: FetchId) -> Option<&FetchHandle> {
        self.handles.iter().find(|h| h.id() == id)
    }

    /// Number of fetches not yet settled.
    pub fn pending(&self) -> usize {
        self.join.outstanding()
    }

    pub fn join_mut(&mut self) -> &mut FetchJoin {
        &mut self.join
    }
}

/// Spawns a task fetching `location`, racing the transport against
/// cancellation.
fn spawn_fetch(
    id: FetchId,
    location: String,
    transport: Arc<dyn Transport>,
    token: CancellationToken,
    completion_tx: mpsc::UnboundedSender<FetchCompletion>,
) {
    tokio::spawn(async move {
        let result = tokio::select! {
            biased;

            _ = token.cancelled() => Err(TransportError::Canceled),

            result = transport.fetch(&location) => result,
        };
        trace!(fetch_id = %id, ok = result.is_ok(), "Fetch task finished");
        // The coordinator may already be gone after a stop.
        let _ = completion_tx.send(FetchCompletion { id, result });
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    fn set_with(transport: MockTransport) -> (FetchSet, mpsc::UnboundedReceiver<FetchCompletion>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            FetchSet::new(Arc::new(transport), tx, CancellationToken::new()),
            rx,
        )
    }

    #[tokio::test]
    async fn test_issue_and_complete() {
        let transport = MockTransport::default().with("https://x/a", b"payload");
        let (mut set, mut rx) = set_with(transport);

        let id = set.issue(
            FetchPurpose::Style,
            "https://x/a",
            FetchTarget::Remote("https://x/a".to_string()),
        );
        assert_eq!(set.pending(), 1);

        let completion = rx.recv().await.unwrap();
        assert_eq!(completion.id, id);
        assert_eq!(completion.result.unwrap(), b"payload".to_vec());

        assert!(set.settle(id, FetchStatus::Succeeded).is_some());
        assert_eq!(set.pending(), 0);
        assert!(set.join_mut().try_fire());
    }

    #[tokio::test]
    async fn test_settle_is_once_only() {
        let (mut set, _rx) = set_with(MockTransport::default());
        let id = set.issue(
            FetchPurpose::SpriteJson,
            "https://x/s",
            FetchTarget::Remote("https://x/s".to_string()),
        );

        assert!(set.settle(id, FetchStatus::Failed).is_some());
        assert!(set.settle(id, FetchStatus::Succeeded).is_none());
        assert!(set.settle(FetchId(99), FetchStatus::Succeeded).is_none());
        assert_eq!(set.get(id).unwrap().status(), FetchStatus::Failed);
    }

    #[tokio::test]
    async fn test_cancel_all_settles_pending() {
        let (mut set, _rx) = set_with(MockTransport::default());
        let a = set.issue(
            FetchPurpose::SpriteJson,
            "https://x/a",
            FetchTarget::Remote("https://x/a".to_string()),
        );
        let b = set.issue(
            FetchPurpose::SpritePng,
            "https://x/b",
            FetchTarget::Remote("https://x/b".to_string()),
        );
        set.settle(a, FetchStatus::Succeeded);

        assert_eq!(set.cancel_all(), 1);
        assert_eq!(set.pending(), 0);
        assert_eq!(set.get(b).unwrap().status(), FetchStatus::Canceled);
        // A late completion for the cancelled fetch is ignored.
        assert!(set.settle(b, FetchStatus::Succeeded).is_none());
    }

    #[tokio::test]
    async fn test_parent_cancel_reports_canceled() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let parent = CancellationToken::new();
        parent.cancel();
        let mut set = FetchSet::new(
            Arc::new(MockTransport::default().with("https://x/a", b"x")),
            tx,
            parent,
        );

        set.issue(
            FetchPurpose::Style,
            "https://x/a",
            FetchTarget::Remote("https://x/a".to_string()),
        );
        let completion = rx.recv().await.unwrap();
        assert_eq!(completion.result, Err(TransportError::Canceled));
    }
}
