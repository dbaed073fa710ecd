//! Pipeline configuration types.

use crate::style::Source;
use crate::view::Presentation;
use std::fmt;

/// Size of the offline-rendered background tile in pixels.
pub const OFFLINE_TILE_SIZE: RenderSize = RenderSize {
    width: 512,
    height: 512,
};

/// Minimum screen importance for hybrid raster tiles.
///
/// Tuned so a tile loads once it covers about half of a 1024×1024 area,
/// which keeps the visual error of the rasterized background bounded.
pub const HYBRID_MIN_IMPORTANCE: f64 = 1024.0 * 1024.0 / 2.0;

/// Screen importance threshold for the paging layer.
pub const PAGING_IMPORTANCE: f64 = 512.0 * 512.0;

/// Inclusive zoom range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoomRange {
    pub min: u8,
    pub max: u8,
}

impl ZoomRange {
    pub fn new(min: u8, max: u8) -> Self {
        Self { min, max }
    }

    /// Smallest range covering both.
    pub fn union(self, other: ZoomRange) -> ZoomRange {
        ZoomRange {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

impl fmt::Display for ZoomRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// Union of the zoom ranges of every resolved source.
///
/// Returns `None` when no source carries a tile-spec.
pub fn zoom_union(sources: &[Source]) -> Option<ZoomRange> {
    sources
        .iter()
        .filter_map(|s| s.tile_spec.as_ref())
        .map(|spec| ZoomRange::new(spec.min_zoom, spec.max_zoom))
        .reduce(ZoomRange::union)
}

/// Coordinate system tiles are addressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoordSystem {
    #[default]
    SphericalMercator,
}

/// Sampling parameters for the hybrid raster loader.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingParams {
    pub coord_system: CoordSystem,
    pub min_zoom: u8,
    pub max_zoom: u8,
    /// Load one zoom level at a time.
    pub single_level: bool,
    pub min_importance: f64,
    /// Extend coverage over the poles.
    pub cover_poles: bool,
    /// Match edges between neighbouring tiles of different levels.
    pub edge_matching: bool,
}

impl SamplingParams {
    /// Parameters for a hybrid pipeline over `range`.
    ///
    /// Pole coverage and edge matching only make sense on a globe.
    pub fn hybrid(range: ZoomRange, presentation: Presentation) -> Self {
        let globe = presentation.is_globe();
        Self {
            coord_system: CoordSystem::SphericalMercator,
            min_zoom: range.min,
            max_zoom: range.max,
            single_level: true,
            min_importance: HYBRID_MIN_IMPORTANCE,
            cover_poles: globe,
            edge_matching: globe,
        }
    }
}

/// Configuration of the legacy paging layer.
#[derive(Debug, Clone, PartialEq)]
pub struct PagingLayerConfig {
    pub coord_system: CoordSystem,
    pub min_zoom: u8,
    pub max_zoom: u8,
    pub single_level_loading: bool,
    pub importance: f64,
}

impl PagingLayerConfig {
    pub fn new(range: ZoomRange) -> Self {
        Self {
            coord_system: CoordSystem::SphericalMercator,
            min_zoom: range.min,
            max_zoom: range.max,
            single_level_loading: true,
            importance: PAGING_IMPORTANCE,
        }
    }
}

/// How a tile source is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileSourceKind {
    /// Fed to the hybrid raster loader.
    Raster,
    /// Fed to the legacy paging layer.
    LegacyVector,
}

/// A tile source handed to a tile loading engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileSource {
    pub name: String,
    pub kind: TileSourceKind,
    pub min_zoom: u8,
    pub max_zoom: u8,
    pub tile_urls: Vec<String>,
}

impl TileSource {
    /// Builds a tile source from a resolved style source.
    ///
    /// Returns `None` if the source has no tile-spec yet.
    pub fn from_source(source: &Source, kind: TileSourceKind) -> Option<Self> {
        let spec = source.tile_spec.as_ref()?;
        Some(Self {
            name: source.name.clone(),
            kind,
            min_zoom: spec.min_zoom,
            max_zoom: spec.max_zoom,
            tile_urls: spec.tiles.clone(),
        })
    }
}

/// Pixel size of an offline render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSize {
    pub width: u32,
    pub height: u32,
}

/// Handle to an offscreen render produced by an offline renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTarget {
    pub id: u64,
    pub size: RenderSize,
}

/// Address of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileKey {
    pub zoom: u8,
    pub x: u32,
    pub y: u32,
}

impl TileKey {
    pub fn new(zoom: u8, x: u32, y: u32) -> Self {
        Self { zoom, x, y }
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{SourceKind, TileSpec};

    fn source(name: &str, range: Option<(u8, u8)>) -> Source {
        Source {
            name: name.to_string(),
            kind: SourceKind::Vector,
            tile_spec: range.map(|(min, max)| TileSpec::new(min, max, vec!["t".to_string()])),
            url: None,
        }
    }

    #[test]
    fn test_zoom_union_of_two_sources() {
        let sources = vec![source("a", Some((2, 10))), source("b", Some((5, 14)))];
        assert_eq!(zoom_union(&sources), Some(ZoomRange::new(2, 14)));
    }

    #[test]
    fn test_zoom_union_ignores_unresolved() {
        let sources = vec![source("a", None), source("b", Some((3, 9)))];
        assert_eq!(zoom_union(&sources), Some(ZoomRange::new(3, 9)));
    }

    #[test]
    fn test_zoom_union_empty() {
        assert_eq!(zoom_union(&[]), None);
        assert_eq!(zoom_union(&[source("a", None)]), None);
    }

    #[test]
    fn test_hybrid_sampling_globe_vs_flat() {
        let range = ZoomRange::new(0, 12);

        let globe = SamplingParams::hybrid(range, Presentation::Globe);
        assert!(globe.cover_poles && globe.edge_matching);
        assert!(globe.single_level);
        assert_eq!(globe.min_importance, HYBRID_MIN_IMPORTANCE);

        let flat = SamplingParams::hybrid(range, Presentation::Flat);
        assert!(!flat.cover_poles && !flat.edge_matching);
    }

    #[test]
    fn test_paging_config() {
        let config = PagingLayerConfig::new(ZoomRange::new(1, 14));
        assert!(config.single_level_loading);
        assert_eq!(config.importance, PAGING_IMPORTANCE);
        assert_eq!((config.min_zoom, config.max_zoom), (1, 14));
    }

    #[test]
    fn test_tile_source_requires_tile_spec() {
        assert!(TileSource::from_source(&source("a", None), TileSourceKind::Raster).is_none());

        let tile_source =
            TileSource::from_source(&source("a", Some((0, 12))), TileSourceKind::LegacyVector)
                .unwrap();
        assert_eq!(tile_source.kind, TileSourceKind::LegacyVector);
        assert_eq!(tile_source.tile_urls, vec!["t".to_string()]);
    }
}
