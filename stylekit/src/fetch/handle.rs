//! Fetch handles.

use crate::locator::FetchTarget;
use std::fmt;
use tokio_util::sync::CancellationToken;

/// Identifier of a fetch within one session run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FetchId(pub u64);

impl fmt::Display for FetchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fetch-{}", self.0)
    }
}

/// What a fetched payload is used for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchPurpose {
    /// The style document itself.
    Style,
    /// TileJSON for the named source.
    TileSpec { source: String },
    /// Sprite metadata.
    SpriteJson,
    /// Sprite atlas image.
    SpritePng,
}

impl fmt::Display for FetchPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Style => write!(f, "style"),
            Self::TileSpec { source } => write!(f, "tile-spec({})", source),
            Self::SpriteJson => write!(f, "sprite-json"),
            Self::SpritePng => write!(f, "sprite-png"),
        }
    }
}

/// Lifecycle of a single fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FetchStatus {
    #[default]
    Pending,
    Succeeded,
    Failed,
    Canceled,
}

impl FetchStatus {
    /// Terminal states: Succeeded, Failed, Canceled.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Succeeded => write!(f, "Succeeded"),
            Self::Failed => write!(f, "Failed"),
            Self::Canceled => write!(f, "Canceled"),
        }
    }
}

/// An outstanding or settled fetch.
///
/// The coordinator owns every handle. Cancelling the token makes the fetch
/// task report [`FetchStatus::Canceled`] instead of a payload.
#[derive(Debug)]
pub struct FetchHandle {
    id: FetchId,
    purpose: FetchPurpose,
    url: String,
    target: FetchTarget,
    cancel: CancellationToken,
    status: FetchStatus,
}

impl FetchHandle {
    pub(crate) fn new(
        id: FetchId,
        purpose: FetchPurpose,
        url: String,
        target: FetchTarget,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            id,
            purpose,
            url,
            target,
            cancel,
            status: FetchStatus::Pending,
        }
    }

    pub fn id(&self) -> FetchId {
        self.id
    }

    pub fn purpose(&self) -> &FetchPurpose {
        &self.purpose
    }

    /// The logical URL, before cache or override rewriting.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Where the bytes are actually read from.
    pub fn target(&self) -> &FetchTarget {
        &self.target
    }

    pub fn status(&self) -> FetchStatus {
        self.status
    }

    pub fn is_pending(&self) -> bool {
        !self.status.is_terminal()
    }

    pub(crate) fn set_status(&mut self, status: FetchStatus) {
        self.status = status;
    }

    pub(crate) fn cancel(&mut self) {
        self.cancel.cancel();
        self.status = FetchStatus::Canceled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_terminal() {
        assert!(!FetchStatus::Pending.is_terminal());
        assert!(FetchStatus::Succeeded.is_terminal());
        assert!(FetchStatus::Failed.is_terminal());
        assert!(FetchStatus::Canceled.is_terminal());
    }

    #[test]
    fn test_cancel_trips_token() {
        let token = CancellationToken::new();
        let mut handle = FetchHandle::new(
            FetchId(1),
            FetchPurpose::Style,
            "https://x/style.json".to_string(),
            FetchTarget::Remote("https://x/style.json".to_string()),
            token.clone(),
        );
        assert!(handle.is_pending());

        handle.cancel();
        assert!(token.is_cancelled());
        assert_eq!(handle.status(), FetchStatus::Canceled);
    }

    #[test]
    fn test_purpose_display() {
        let purpose = FetchPurpose::TileSpec {
            source: "openmaptiles".to_string(),
        };
        assert_eq!(purpose.to_string(), "tile-spec(openmaptiles)");
    }
}
