//! Headless backend that records what a pipeline would do.
//!
//! Implements the view and every engine collaborator without drawing
//! anything. Used by the CLI to inspect the pipeline a style produces and
//! by tests to assert on the exact calls a session made.

use super::interpreter::TileInterpreter;
use super::traits::{
    ActiveLoader, EngineError, OfflineRenderer, PagingEngine, PipelineBackend, RasterTileEngine,
};
use super::types::{PagingLayerConfig, RenderSize, RenderTarget, SamplingParams, TileSource};
use crate::style::{Color, StyleDocument};
use crate::view::{LayerId, MapView, Presentation};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::trace;

/// A call recorded by [`HeadlessBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum HeadlessEvent {
    Rendered { target: RenderTarget, layers: usize },
    Released(RenderTarget),
    RasterStarted {
        layer: LayerId,
        params: SamplingParams,
        sources: Vec<TileSource>,
    },
    PagingCreated {
        layer: LayerId,
        config: PagingLayerConfig,
        source: TileSource,
    },
    Added(LayerId),
    Removed(LayerId),
    ClearColor(Color),
    Shutdown(LayerId),
}

#[derive(Default)]
struct Recorder {
    events: Vec<HeadlessEvent>,
    attached: Vec<LayerId>,
    live_targets: Vec<RenderTarget>,
    interpreters: HashMap<LayerId, Arc<dyn TileInterpreter>>,
}

/// Recording view, raster engine, paging engine and offline renderer.
pub struct HeadlessBackend {
    presentation: Presentation,
    recorder: Arc<Mutex<Recorder>>,
    next_id: AtomicU64,
    fail_raster: AtomicBool,
    fail_paging: AtomicBool,
    fail_render: AtomicBool,
}

impl HeadlessBackend {
    pub fn new(presentation: Presentation) -> Self {
        Self {
            presentation,
            recorder: Arc::new(Mutex::new(Recorder::default())),
            next_id: AtomicU64::new(1),
            fail_raster: AtomicBool::new(false),
            fail_paging: AtomicBool::new(false),
            fail_render: AtomicBool::new(false),
        }
    }

    /// A [`PipelineBackend`] wiring this instance into every slot.
    pub fn backend(self: &Arc<Self>) -> PipelineBackend {
        PipelineBackend::new()
            .with_view(self.clone())
            .with_raster_engine(self.clone())
            .with_paging_engine(self.clone())
            .with_renderer(self.clone())
    }

    pub fn presentation(&self) -> Presentation {
        self.presentation
    }

    /// Makes subsequent raster loader starts fail.
    pub fn fail_raster_start(&self) {
        self.fail_raster.store(true, Ordering::SeqCst);
    }

    /// Makes subsequent paging layer creation fail.
    pub fn fail_paging(&self) {
        self.fail_paging.store(true, Ordering::SeqCst);
    }

    /// Makes subsequent offline renders fail.
    pub fn fail_render(&self) {
        self.fail_render.store(true, Ordering::SeqCst);
    }

    /// Every recorded call, oldest first.
    pub fn events(&self) -> Vec<HeadlessEvent> {
        self.recorder.lock().events.clone()
    }

    /// Layers currently attached to the view.
    pub fn attached(&self) -> Vec<LayerId> {
        self.recorder.lock().attached.clone()
    }

    /// Number of offline renders performed.
    pub fn render_count(&self) -> usize {
        self.recorder
            .lock()
            .events
            .iter()
            .filter(|e| matches!(e, HeadlessEvent::Rendered { .. }))
            .count()
    }

    /// Offline render targets not yet released.
    pub fn live_targets(&self) -> usize {
        self.recorder.lock().live_targets.len()
    }

    /// The interpreter a loader or layer was started with.
    pub fn interpreter(&self, layer: LayerId) -> Option<Arc<dyn TileInterpreter>> {
        self.recorder.lock().interpreters.get(&layer).cloned()
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn record(&self, event: HeadlessEvent) {
        trace!(?event, "Headless call");
        self.recorder.lock().events.push(event);
    }

    fn loader(&self, id: LayerId, interpreter: Arc<dyn TileInterpreter>) -> Box<dyn ActiveLoader> {
        self.recorder.lock().interpreters.insert(id, interpreter);
        Box::new(HeadlessLoader {
            id,
            recorder: Arc::clone(&self.recorder),
            shut_down: false,
        })
    }
}

impl MapView for HeadlessBackend {
    fn presentation(&self) -> Presentation {
        self.presentation
    }

    fn add(&self, layer: LayerId) {
        let mut recorder = self.recorder.lock();
        recorder.attached.push(layer);
        recorder.events.push(HeadlessEvent::Added(layer));
    }

    fn remove(&self, layer: LayerId) {
        let mut recorder = self.recorder.lock();
        recorder.attached.retain(|l| *l != layer);
        recorder.events.push(HeadlessEvent::Removed(layer));
    }

    fn set_clear_color(&self, color: Color) {
        self.record(HeadlessEvent::ClearColor(color));
    }
}

impl OfflineRenderer for HeadlessBackend {
    fn render(&self, style: &StyleDocument, size: RenderSize) -> Result<RenderTarget, EngineError> {
        if self.fail_render.load(Ordering::SeqCst) {
            return Err(EngineError::Render("headless render disabled".to_string()));
        }
        let target = RenderTarget {
            id: self.next_id(),
            size,
        };
        let mut recorder = self.recorder.lock();
        recorder.live_targets.push(target);
        recorder.events.push(HeadlessEvent::Rendered {
            target,
            layers: style.layers.len(),
        });
        Ok(target)
    }

    fn release(&self, target: RenderTarget) {
        let mut recorder = self.recorder.lock();
        recorder.live_targets.retain(|t| *t != target);
        recorder.events.push(HeadlessEvent::Released(target));
    }
}

impl RasterTileEngine for HeadlessBackend {
    fn start(
        &self,
        params: &SamplingParams,
        sources: &[TileSource],
        interpreter: Arc<dyn TileInterpreter>,
    ) -> Result<Box<dyn ActiveLoader>, EngineError> {
        if self.fail_raster.load(Ordering::SeqCst) {
            return Err(EngineError::Loader("headless raster loader disabled".to_string()));
        }
        let layer = LayerId(self.next_id());
        self.record(HeadlessEvent::RasterStarted {
            layer,
            params: params.clone(),
            sources: sources.to_vec(),
        });
        Ok(self.loader(layer, interpreter))
    }
}

impl PagingEngine for HeadlessBackend {
    fn create_layer(
        &self,
        config: &PagingLayerConfig,
        source: &TileSource,
        delegate: Arc<dyn TileInterpreter>,
    ) -> Result<Box<dyn ActiveLoader>, EngineError> {
        if self.fail_paging.load(Ordering::SeqCst) {
            return Err(EngineError::Paging("headless paging disabled".to_string()));
        }
        let layer = LayerId(self.next_id());
        self.record(HeadlessEvent::PagingCreated {
            layer,
            config: config.clone(),
            source: source.clone(),
        });
        Ok(self.loader(layer, delegate))
    }
}

struct HeadlessLoader {
    id: LayerId,
    recorder: Arc<Mutex<Recorder>>,
    shut_down: bool,
}

impl ActiveLoader for HeadlessLoader {
    fn id(&self) -> LayerId {
        self.id
    }

    fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        let mut recorder = self.recorder.lock();
        recorder.interpreters.remove(&self.id);
        recorder.events.push(HeadlessEvent::Shutdown(self.id));
    }
}
