//! Engine collaborators the pipeline selector drives.
//!
//! Tile loading, rendering and drawing are host concerns. The selector
//! only configures and attaches them through these traits.

use super::interpreter::TileInterpreter;
use super::types::{PagingLayerConfig, RenderSize, RenderTarget, SamplingParams, TileSource};
use crate::style::StyleDocument;
use crate::view::{LayerId, MapView};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Errors reported by engine collaborators.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("Offline render failed: {0}")]
    Render(String),

    #[error("Tile loader failed to start: {0}")]
    Loader(String),

    #[error("Paging layer could not be created: {0}")]
    Paging(String),
}

/// Renders a style into an offscreen target.
pub trait OfflineRenderer: Send + Sync {
    /// Renders `style` at `size`.
    fn render(&self, style: &StyleDocument, size: RenderSize) -> Result<RenderTarget, EngineError>;

    /// Releases a target previously returned by [`render`](Self::render).
    fn release(&self, target: RenderTarget);
}

/// A running loader or layer. Shut down exactly once on teardown.
pub trait ActiveLoader: Send + Sync {
    /// Identifier the loader is attached to the view under.
    fn id(&self) -> LayerId;

    /// Stops loading and releases engine resources.
    fn shutdown(&mut self);
}

/// Raster tile loading engine used by the hybrid pipeline.
pub trait RasterTileEngine: Send + Sync {
    fn start(
        &self,
        params: &SamplingParams,
        sources: &[TileSource],
        interpreter: Arc<dyn TileInterpreter>,
    ) -> Result<Box<dyn ActiveLoader>, EngineError>;
}

/// Legacy paging engine used by the pure vector pipeline.
pub trait PagingEngine: Send + Sync {
    fn create_layer(
        &self,
        config: &PagingLayerConfig,
        source: &TileSource,
        delegate: Arc<dyn TileInterpreter>,
    ) -> Result<Box<dyn ActiveLoader>, EngineError>;
}

/// The collaborators a session builds its pipeline from.
///
/// Only the view is mandatory. Missing engines surface as construction
/// errors when a pipeline needs them.
#[derive(Clone, Default)]
pub struct PipelineBackend {
    pub view: Option<Arc<dyn MapView>>,
    pub raster_engine: Option<Arc<dyn RasterTileEngine>>,
    pub paging_engine: Option<Arc<dyn PagingEngine>>,
    pub renderer: Option<Arc<dyn OfflineRenderer>>,
}

impl PipelineBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_view(mut self, view: Arc<dyn MapView>) -> Self {
        self.view = Some(view);
        self
    }

    pub fn with_raster_engine(mut self, engine: Arc<dyn RasterTileEngine>) -> Self {
        self.raster_engine = Some(engine);
        self
    }

    pub fn with_paging_engine(mut self, engine: Arc<dyn PagingEngine>) -> Self {
        self.paging_engine = Some(engine);
        self
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn OfflineRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }
}

impl fmt::Debug for PipelineBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineBackend")
            .field("view", &self.view.is_some())
            .field("raster_engine", &self.raster_engine.is_some())
            .field("paging_engine", &self.paging_engine.is_some())
            .field("renderer", &self.renderer.is_some())
            .finish()
    }
}
