//! Parsed style document model.

use super::color::Color;
use crate::view::Presentation;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

/// TileJSON default minimum zoom.
pub const DEFAULT_MIN_ZOOM: u8 = 0;

/// TileJSON default maximum zoom.
pub const DEFAULT_MAX_ZOOM: u8 = 22;

/// A parsed style document.
///
/// Created once per successful parse. The only mutation after parsing is
/// filling in each [`Source`]'s tile-spec once its TileJSON arrives.
#[derive(Debug, Clone)]
pub struct StyleDocument {
    /// Style name (may be empty).
    pub name: String,
    /// Style format version.
    pub version: u32,
    /// Sources in declaration order.
    pub sources: Vec<Source>,
    /// Layers in draw order, after any layer filter was applied.
    pub layers: Vec<StyleLayer>,
    /// Sprite base URL, without the `@2x.json` / `@2x.png` suffix.
    pub sprite: Option<String>,
    /// Glyph URL template.
    pub glyphs: Option<String>,
    /// Fonts resolved through the caller's font override.
    pub fonts: Vec<FontBinding>,
    /// Presentation mode the document was interpreted for.
    pub presentation: Presentation,
}

impl StyleDocument {
    /// Find a layer by ID.
    pub fn layer_by_id(&self, id: &str) -> Option<&StyleLayer> {
        self.layers.iter().find(|l| l.id == id)
    }

    /// Find a source by name.
    pub fn source(&self, name: &str) -> Option<&Source> {
        self.sources.iter().find(|s| s.name == name)
    }

    /// Mutable access to a source by name.
    pub fn source_mut(&mut self, name: &str) -> Option<&mut Source> {
        self.sources.iter_mut().find(|s| s.name == name)
    }

    /// Returns true once every source carries a tile-spec.
    pub fn all_sources_resolved(&self) -> bool {
        self.sources.iter().all(Source::is_resolved)
    }

    /// Color of the layer named `background`, if it declares one.
    pub fn background_color(&self) -> Option<Color> {
        let layer = self.layer_by_id("background")?;
        layer.paint.background_color
    }
}

/// Kind of data a source provides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    Vector,
    Raster,
    Other(String),
}

impl SourceKind {
    pub(crate) fn from_type(value: &str) -> Self {
        match value {
            "vector" => Self::Vector,
            "raster" => Self::Raster,
            other => Self::Other(other.to_string()),
        }
    }
}

/// A named reference to a tile provider.
#[derive(Debug, Clone)]
pub struct Source {
    /// Source name as declared in the style.
    pub name: String,
    /// Source type.
    pub kind: SourceKind,
    /// Tile-spec, inline or filled in after its TileJSON was fetched.
    pub tile_spec: Option<TileSpec>,
    /// Remote TileJSON URL, if the source is not described inline.
    pub url: Option<String>,
}

impl Source {
    /// A source is resolved once it has a tile-spec.
    pub fn is_resolved(&self) -> bool {
        self.tile_spec.is_some()
    }
}

/// Zoom range and tile URL templates of a source.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TileSpec {
    #[serde(rename = "minzoom", default = "default_min_zoom")]
    pub min_zoom: u8,
    #[serde(rename = "maxzoom", default = "default_max_zoom")]
    pub max_zoom: u8,
    #[serde(default)]
    pub tiles: Vec<String>,
}

fn default_min_zoom() -> u8 {
    DEFAULT_MIN_ZOOM
}

fn default_max_zoom() -> u8 {
    DEFAULT_MAX_ZOOM
}

impl TileSpec {
    /// Creates a tile-spec from parts.
    pub fn new(min_zoom: u8, max_zoom: u8, tiles: Vec<String>) -> Self {
        Self {
            min_zoom,
            max_zoom,
            tiles,
        }
    }
}

/// Layer types of the style language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerType {
    Background,
    Fill,
    Line,
    Symbol,
    Circle,
    Raster,
    FillExtrusion,
    Hillshade,
    Heatmap,
    Unknown,
}

impl LayerType {
    pub(crate) fn from_type(value: &str) -> Self {
        match value {
            "background" => Self::Background,
            "fill" => Self::Fill,
            "line" => Self::Line,
            "symbol" => Self::Symbol,
            "circle" => Self::Circle,
            "raster" => Self::Raster,
            "fill-extrusion" => Self::FillExtrusion,
            "hillshade" => Self::Hillshade,
            "heatmap" => Self::Heatmap,
            _ => Self::Unknown,
        }
    }

    /// Background and fill layers: the polygon-producing layers a hybrid
    /// pipeline can pre-render into a raster.
    pub fn is_polygon_background(&self) -> bool {
        matches!(self, Self::Background | Self::Fill)
    }
}

impl fmt::Display for LayerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Background => "background",
            Self::Fill => "fill",
            Self::Line => "line",
            Self::Symbol => "symbol",
            Self::Circle => "circle",
            Self::Raster => "raster",
            Self::FillExtrusion => "fill-extrusion",
            Self::Hillshade => "hillshade",
            Self::Heatmap => "heatmap",
            Self::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

/// Paint properties the orchestrator reads. Everything else stays with the
/// renderer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerPaint {
    pub background_color: Option<Color>,
    pub fill_color: Option<Color>,
}

/// A single style layer.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleLayer {
    /// Unique layer ID.
    pub id: String,
    /// Layer type.
    pub layer_type: LayerType,
    /// Source name, for data layers.
    pub source: Option<String>,
    /// Source layer inside a vector tile.
    pub source_layer: Option<String>,
    /// Minimum zoom at which the layer is drawn.
    pub min_zoom: Option<f32>,
    /// Maximum zoom at which the layer is drawn.
    pub max_zoom: Option<f32>,
    /// False when `layout.visibility` is `none`.
    pub visible: bool,
    /// Font stack for symbol layers.
    pub text_font: Vec<String>,
    /// Sprite icon drawn by symbol layers, when given as a literal name.
    pub icon_image: Option<String>,
    /// Paint properties.
    pub paint: LayerPaint,
    /// Draw priority derived from the style settings and layer position.
    pub draw_priority: i32,
    /// Size multiplier from the render settings for this layer type.
    pub size_scale: f32,
}

impl StyleLayer {
    /// Returns true if the layer draws at `zoom`.
    pub fn visible_at(&self, zoom: f32) -> bool {
        let min_ok = self.min_zoom.map(|z| zoom >= z).unwrap_or(true);
        let max_ok = self.max_zoom.map(|z| zoom < z).unwrap_or(true);
        self.visible && min_ok && max_ok
    }
}

/// Font returned by a caller's font override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontDescriptor {
    /// Family name the renderer should use.
    pub family: String,
    /// Font file, when the override points at one.
    pub path: Option<PathBuf>,
}

impl FontDescriptor {
    /// Descriptor naming a family only.
    pub fn family(family: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            path: None,
        }
    }
}

/// A style font name bound to a concrete font.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontBinding {
    pub name: String,
    pub descriptor: FontDescriptor,
}
