//! Pipeline selection and assembly.
//!
//! When a session's style and every source tile-spec are in hand, the
//! [`PipelineSelector`] builds one of two pipelines and attaches it to the
//! view:
//!
//! - **Hybrid**: a raster tile loader over the first source. Background and
//!   fill layers are optionally pre-rendered offline into a 512×512 raster;
//!   the remaining layers draw as vectors above it.
//! - **Paging**: a legacy paging layer drawing the full style as vectors,
//!   with the view cleared to the style's background color.
//!
//! Engines are host collaborators behind the traits in this module.
//! [`headless`] provides a recording implementation of all of them.

mod descriptor;
pub mod headless;
mod interpreter;
mod selector;
mod traits;
mod types;

pub use descriptor::{
    HybridPipeline, PagingPipeline, PipelineDescriptor, PipelineKind, PipelineSummary,
};
pub use headless::{HeadlessBackend, HeadlessEvent};
pub use interpreter::{
    HybridInterpreter, LayerRef, OfflineBackground, PagingDelegate, TileInterpreter, TilePlan,
};
pub use selector::{PipelineOptions, PipelineSelector};
pub use crate::style::{IMAGE_LAYER_DRAW_PRIORITY, VECTOR_OVERLAY_PRIORITY_OFFSET};
pub use traits::{
    ActiveLoader, EngineError, OfflineRenderer, PagingEngine, PipelineBackend, RasterTileEngine,
};
pub use types::{
    zoom_union, CoordSystem, PagingLayerConfig, RenderSize, RenderTarget, SamplingParams, TileKey,
    TileSource, TileSourceKind, ZoomRange, HYBRID_MIN_IMPORTANCE, OFFLINE_TILE_SIZE,
    PAGING_IMPORTANCE,
};
