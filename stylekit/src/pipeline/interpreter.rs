//! Per-tile interpretation of a parsed style.
//!
//! Tile engines call back into a [`TileInterpreter`] for every tile they
//! load. The interpreter decides which style layers contribute to that
//! tile and whether an offline-rendered background goes underneath.

use super::types::{RenderTarget, TileKey};
use crate::style::{SpriteEntry, Sprites, StyleDocument, IMAGE_LAYER_DRAW_PRIORITY};
use std::sync::Arc;

/// Reference to a style layer drawn for a tile.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerRef {
    pub id: String,
    pub draw_priority: i32,
    /// Line width, text size or marker size multiplier.
    pub scale: f32,
    /// Atlas entry of the layer's icon, when the sprite provides it.
    pub icon: Option<SpriteEntry>,
}

/// What to draw for one tile.
#[derive(Debug, Clone, PartialEq)]
pub struct TilePlan {
    pub tile: TileKey,
    /// Offline render drawn as the tile's raster image, if any.
    pub background: Option<RenderTarget>,
    /// Draw priority of the raster image.
    pub image_priority: Option<i32>,
    /// Layers pre-rendered into the raster image.
    pub raster_layers: Vec<LayerRef>,
    /// Layers drawn as vector geometry.
    pub vector_layers: Vec<LayerRef>,
}

impl TilePlan {
    fn empty(tile: TileKey) -> Self {
        Self {
            tile,
            background: None,
            image_priority: None,
            raster_layers: Vec::new(),
            vector_layers: Vec::new(),
        }
    }

    /// Returns true if nothing is drawn for this tile.
    pub fn is_empty(&self) -> bool {
        self.background.is_none() && self.vector_layers.is_empty()
    }
}

/// Callback used by tile engines to interpret a loaded tile.
pub trait TileInterpreter: Send + Sync {
    fn interpret(&self, tile: TileKey) -> TilePlan;
}

/// The offline-rendered background of a hybrid pipeline.
#[derive(Debug, Clone)]
pub struct OfflineBackground {
    /// Style restricted to background and fill layers.
    pub style: StyleDocument,
    pub target: RenderTarget,
}

/// Interpreter for the hybrid raster+vector pipeline.
///
/// Polygons come from the offline render, everything else from the vector
/// overlay style whose priorities sit above the raster image.
#[derive(Debug)]
pub struct HybridInterpreter {
    background: Option<OfflineBackground>,
    overlay: StyleDocument,
    sprites: Arc<Sprites>,
}

impl HybridInterpreter {
    pub fn new(
        background: Option<OfflineBackground>,
        overlay: StyleDocument,
        sprites: Arc<Sprites>,
    ) -> Self {
        Self {
            background,
            overlay,
            sprites,
        }
    }

    pub fn background(&self) -> Option<&OfflineBackground> {
        self.background.as_ref()
    }

    pub fn overlay(&self) -> &StyleDocument {
        &self.overlay
    }
}

impl TileInterpreter for HybridInterpreter {
    fn interpret(&self, tile: TileKey) -> TilePlan {
        let mut plan = TilePlan::empty(tile);
        let zoom = f32::from(tile.zoom);

        if let Some(background) = &self.background {
            plan.background = Some(background.target);
            plan.image_priority = Some(IMAGE_LAYER_DRAW_PRIORITY);
            plan.raster_layers = visible_layers(&background.style, &self.sprites, zoom);
        }
        plan.vector_layers = visible_layers(&self.overlay, &self.sprites, zoom);
        plan
    }
}

/// Interpreter backing the legacy paging layer. Draws the full style as
/// vector geometry.
#[derive(Debug)]
pub struct PagingDelegate {
    style: StyleDocument,
    sprites: Arc<Sprites>,
}

impl PagingDelegate {
    pub fn new(style: StyleDocument, sprites: Arc<Sprites>) -> Self {
        Self { style, sprites }
    }

    pub fn style(&self) -> &StyleDocument {
        &self.style
    }
}

impl TileInterpreter for PagingDelegate {
    fn interpret(&self, tile: TileKey) -> TilePlan {
        let mut plan = TilePlan::empty(tile);
        plan.vector_layers = visible_layers(&self.style, &self.sprites, f32::from(tile.zoom));
        plan
    }
}

fn visible_layers(style: &StyleDocument, sprites: &Sprites, zoom: f32) -> Vec<LayerRef> {
    style
        .layers
        .iter()
        .filter(|layer| layer.visible_at(zoom))
        .map(|layer| LayerRef {
            id: layer.id.clone(),
            draw_priority: layer.draw_priority,
            scale: layer.size_scale,
            // Icons missing from the sprite are dropped, not fatal
            icon: layer
                .icon_image
                .as_deref()
                .and_then(|name| sprites.icon(name))
                .cloned(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::OFFLINE_TILE_SIZE;
    use crate::style::{
        polygon_background_filter, vector_overlay_filter, JsonStyleResolver, StyleResolver,
        StyleSettings,
    };
    use crate::view::Presentation;

    const STYLE: &[u8] = br##"{
        "version": 8,
        "sources": {"v": {"type": "vector", "tiles": ["https://t/{z}/{x}/{y}.pbf"]}},
        "layers": [
            {"id": "background", "type": "background", "paint": {"background-color": "#eeeeee"}},
            {"id": "water", "type": "fill", "source": "v", "source-layer": "water"},
            {"id": "roads", "type": "line", "source": "v", "source-layer": "roads", "minzoom": 6},
            {"id": "labels", "type": "symbol", "source": "v", "source-layer": "places", "maxzoom": 10, "layout": {"icon-image": "airport"}}
        ]
    }"##;

    fn parse(settings: &StyleSettings, filter: Option<crate::style::LayerFilter>) -> StyleDocument {
        JsonStyleResolver::new()
            .parse(STYLE, settings, Presentation::Flat, filter.as_ref())
            .unwrap()
    }

    fn ids(layers: &[LayerRef]) -> Vec<&str> {
        layers.iter().map(|l| l.id.as_str()).collect()
    }

    #[test]
    fn test_hybrid_plan_splits_layers() {
        let settings = StyleSettings::default();
        let background = OfflineBackground {
            style: parse(&settings, Some(polygon_background_filter())),
            target: RenderTarget {
                id: 1,
                size: OFFLINE_TILE_SIZE,
            },
        };
        let overlay = parse(&settings.above_raster(), Some(vector_overlay_filter()));
        let interpreter =
            HybridInterpreter::new(Some(background), overlay, Arc::new(Sprites::default()));

        let plan = interpreter.interpret(TileKey::new(8, 10, 20));
        assert_eq!(plan.image_priority, Some(IMAGE_LAYER_DRAW_PRIORITY));
        assert_eq!(ids(&plan.raster_layers), vec!["background", "water"]);
        assert_eq!(ids(&plan.vector_layers), vec!["roads", "labels"]);
        assert!(plan
            .vector_layers
            .iter()
            .all(|l| l.draw_priority > IMAGE_LAYER_DRAW_PRIORITY));
    }

    #[test]
    fn test_hybrid_plan_respects_zoom() {
        let overlay = parse(&StyleSettings::default().above_raster(), Some(vector_overlay_filter()));
        let interpreter = HybridInterpreter::new(None, overlay, Arc::new(Sprites::default()));

        assert_eq!(ids(&interpreter.interpret(TileKey::new(3, 0, 0)).vector_layers), vec!["labels"]);
        assert_eq!(ids(&interpreter.interpret(TileKey::new(12, 0, 0)).vector_layers), vec!["roads"]);
    }

    #[test]
    fn test_hybrid_without_background_has_no_image() {
        let overlay = parse(&StyleSettings::default(), None);
        let interpreter = HybridInterpreter::new(None, overlay, Arc::new(Sprites::default()));

        let plan = interpreter.interpret(TileKey::new(7, 1, 1));
        assert!(plan.background.is_none());
        assert!(plan.image_priority.is_none());
        assert!(plan.raster_layers.is_empty());
    }

    #[test]
    fn test_paging_delegate_draws_full_style() {
        let delegate = PagingDelegate::new(parse(&StyleSettings::default(), None), Arc::new(Sprites::default()));

        let plan = delegate.interpret(TileKey::new(7, 0, 0));
        assert_eq!(ids(&plan.vector_layers), vec!["background", "water", "roads", "labels"]);
        assert!(plan.background.is_none());
        assert!(!plan.is_empty());
    }

    #[test]
    fn test_plan_carries_icons_and_scales() {
        let settings = StyleSettings {
            line_scale: 2.0,
            ..StyleSettings::default()
        };
        let atlas = image::RgbaImage::from_pixel(32, 32, image::Rgba([0, 0, 0, 255]));
        let sprites = Sprites {
            sheet: Some(
                crate::style::SpriteSheet::parse(
                    br#"{"airport": {"x": 0, "y": 0, "width": 16, "height": 16, "pixelRatio": 2},
                         "ferry": {"x": 64, "y": 0, "width": 16, "height": 16}}"#,
                )
                .unwrap(),
            ),
            atlas: Some(crate::style::SpriteAtlas {
                width: atlas.width(),
                height: atlas.height(),
                pixels: atlas.into_raw(),
            }),
        };
        let delegate = PagingDelegate::new(parse(&settings, None), Arc::new(sprites));

        let plan = delegate.interpret(TileKey::new(7, 0, 0));
        let labels = plan.vector_layers.iter().find(|l| l.id == "labels").unwrap();
        assert_eq!(labels.icon.as_ref().map(|i| i.width), Some(16));
        let roads = plan.vector_layers.iter().find(|l| l.id == "roads").unwrap();
        assert_eq!(roads.scale, 2.0);
        assert!(roads.icon.is_none());

        // Without an atlas the icon cannot be drawn.
        let bare = PagingDelegate::new(parse(&settings, None), Arc::new(Sprites::default()));
        let plan = bare.interpret(TileKey::new(7, 0, 0));
        assert!(plan.vector_layers.iter().all(|l| l.icon.is_none()));
    }
}
