//! Style documents and the style resolver collaborator.
//!
//! This module parses Mapbox GL style JSON only as far as the orchestrator
//! needs it: sources and their tile-specs, layer types and zoom ranges, the
//! sprite reference, and the background color. Full style semantics stay
//! with the renderer.
//!
//! Supported inputs:
//! - style documents (version 8)
//! - TileJSON documents for remote sources
//! - `@2x` sprite metadata and PNG atlases

mod color;
mod parser;
mod resolver;
mod sprite;
mod types;

pub use color::Color;
pub use parser::{parse_style, parse_tile_spec};
pub use resolver::{
    polygon_background_filter, vector_overlay_filter, FontOverride, JsonStyleResolver,
    LayerFilter, StyleError, StyleResolver, StyleSettings, IMAGE_LAYER_DRAW_PRIORITY,
    VECTOR_OVERLAY_PRIORITY_OFFSET,
};
pub use sprite::{SpriteAtlas, SpriteEntry, SpriteSheet, SpriteUrls, Sprites};
pub use types::{
    FontBinding, FontDescriptor, LayerPaint, LayerType, Source, SourceKind, StyleDocument,
    StyleLayer, TileSpec, DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM,
};
