//! Session error taxonomy.

use crate::pipeline::EngineError;
use crate::style::StyleError;
use crate::transport::TransportError;
use thiserror::Error;

/// Why a session did not reach an attached pipeline.
///
/// Cloneable so it can travel through the session state channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// A resource could not be retrieved.
    #[error("Failed to fetch {url}: {message}")]
    Transport { url: String, message: String },

    /// A style, TileJSON or sprite payload could not be interpreted.
    #[error("Failed to parse {url}: {message}")]
    Parse { url: String, message: String },

    /// The session or its inputs are misconfigured.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An engine refused to build part of the pipeline.
    #[error("Pipeline construction failed: {0}")]
    PipelineConstruction(String),
}

impl SessionError {
    pub(crate) fn transport(url: &str, err: &TransportError) -> Self {
        Self::Transport {
            url: url.to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn parse(url: &str, err: &StyleError) -> Self {
        Self::Parse {
            url: url.to_string(),
            message: err.to_string(),
        }
    }

    /// Returns true for errors raised before any fetch was issued.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

impl From<EngineError> for SessionError {
    fn from(err: EngineError) -> Self {
        Self::PipelineConstruction(err.to_string())
    }
}
