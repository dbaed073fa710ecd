//! Assembled pipelines and their teardown.

use super::interpreter::{HybridInterpreter, PagingDelegate};
use super::traits::{ActiveLoader, OfflineRenderer};
use super::types::{PagingLayerConfig, RenderTarget, SamplingParams, TileSource, ZoomRange};
use crate::style::Color;
use crate::view::{LayerId, MapView};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Which pipeline a session assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineKind {
    /// Raster tiles with offline-rendered polygons plus a vector overlay.
    Hybrid,
    /// Legacy paging layer drawing everything as vectors.
    Paging,
}

impl fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hybrid => write!(f, "hybrid"),
            Self::Paging => write!(f, "paging"),
        }
    }
}

/// Plain-data description of an attached pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSummary {
    pub kind: PipelineKind,
    pub layer: LayerId,
    pub zoom: ZoomRange,
    /// Tile sources handed to the engine.
    pub sources: Vec<String>,
    /// Offline render backing the raster background, if any.
    pub background: Option<RenderTarget>,
    /// Clear color applied to the view, if any.
    pub clear_color: Option<Color>,
}

/// Hybrid pipeline: raster tile loader driven by a [`HybridInterpreter`].
pub struct HybridPipeline {
    pub sampling: SamplingParams,
    pub sources: Vec<TileSource>,
    pub interpreter: Arc<HybridInterpreter>,
    pub(crate) loader: Box<dyn ActiveLoader>,
    pub(crate) renderer: Option<Arc<dyn OfflineRenderer>>,
}

/// Pure vector pipeline: one paging layer driven by a [`PagingDelegate`].
pub struct PagingPipeline {
    pub config: PagingLayerConfig,
    pub source: TileSource,
    pub delegate: Arc<PagingDelegate>,
    pub clear_color: Option<Color>,
    pub(crate) layer: Box<dyn ActiveLoader>,
}

/// A pipeline attached to a view. Owned by the session that built it.
pub enum PipelineDescriptor {
    Hybrid(HybridPipeline),
    Paging(PagingPipeline),
}

impl PipelineDescriptor {
    pub fn kind(&self) -> PipelineKind {
        match self {
            Self::Hybrid(_) => PipelineKind::Hybrid,
            Self::Paging(_) => PipelineKind::Paging,
        }
    }

    /// Identifier the loader or layer is attached under.
    pub fn layer_id(&self) -> LayerId {
        match self {
            Self::Hybrid(p) => p.loader.id(),
            Self::Paging(p) => p.layer.id(),
        }
    }

    pub fn summary(&self) -> PipelineSummary {
        match self {
            Self::Hybrid(p) => PipelineSummary {
                kind: PipelineKind::Hybrid,
                layer: p.loader.id(),
                zoom: ZoomRange::new(p.sampling.min_zoom, p.sampling.max_zoom),
                sources: p.sources.iter().map(|s| s.name.clone()).collect(),
                background: p.interpreter.background().map(|b| b.target),
                clear_color: None,
            },
            Self::Paging(p) => PipelineSummary {
                kind: PipelineKind::Paging,
                layer: p.layer.id(),
                zoom: ZoomRange::new(p.config.min_zoom, p.config.max_zoom),
                sources: vec![p.source.name.clone()],
                background: None,
                clear_color: p.clear_color,
            },
        }
    }

    /// Detaches the pipeline from `view` and shuts its engine down.
    pub fn teardown(self, view: &dyn MapView) {
        let layer = self.layer_id();
        debug!(layer = %layer, kind = %self.kind(), "Tearing down pipeline");
        view.remove(layer);

        match self {
            Self::Hybrid(mut p) => {
                p.loader.shutdown();
                if let (Some(renderer), Some(background)) = (&p.renderer, p.interpreter.background()) {
                    renderer.release(background.target);
                }
            }
            Self::Paging(mut p) => p.layer.shutdown(),
        }
    }
}

impl fmt::Debug for PipelineDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineDescriptor")
            .field("kind", &self.kind())
            .field("layer", &self.layer_id())
            .finish_non_exhaustive()
    }
}
