//! Style resolver collaborator and its JSON implementation.

use super::parser::parse_style;
use super::types::{FontDescriptor, LayerType, StyleDocument, StyleLayer};
use crate::view::Presentation;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Predicate deciding which layers a style interpretation materializes.
pub type LayerFilter = Arc<dyn Fn(&StyleLayer) -> bool + Send + Sync>;

/// Caller-supplied font lookup for style font names.
pub type FontOverride = Arc<dyn Fn(&str) -> Option<FontDescriptor> + Send + Sync>;

/// Draw priority of the raster image layer in a hybrid pipeline.
pub const IMAGE_LAYER_DRAW_PRIORITY: i32 = 100;

/// Offset added above the raster image layer for vector overlay content.
pub const VECTOR_OVERLAY_PRIORITY_OFFSET: i32 = 1000;

/// Errors produced while parsing style, TileJSON or sprite documents.
#[derive(Debug, Error)]
pub enum StyleError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid style: {0}")]
    Invalid(String),

    #[error("Invalid tile-spec: {0}")]
    TileSpec(String),

    #[error("Invalid sprite: {0}")]
    Sprite(String),
}

/// Render settings applied while interpreting a style.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSettings {
    /// Draw priority of the first layer.
    pub base_draw_priority: i32,
    /// Priority step between consecutive layers.
    pub draw_priority_per_level: i32,
    /// Line width multiplier.
    pub line_scale: f32,
    /// Text size multiplier.
    pub text_scale: f32,
    /// Marker size multiplier.
    pub marker_scale: f32,
}

impl Default for StyleSettings {
    fn default() -> Self {
        Self {
            base_draw_priority: 0,
            draw_priority_per_level: 1,
            line_scale: 1.0,
            text_scale: 1.0,
            marker_scale: 1.0,
        }
    }
}

impl StyleSettings {
    /// Draw priority of the layer at `index` in the full layer list.
    pub fn draw_priority_for(&self, index: usize) -> i32 {
        let index = i32::try_from(index).unwrap_or(i32::MAX);
        self.base_draw_priority
            .saturating_add(index.saturating_mul(self.draw_priority_per_level))
    }

    /// Size multiplier for layers of `layer_type`: lines use the line
    /// scale, symbols the text scale and circles the marker scale.
    pub fn scale_for(&self, layer_type: LayerType) -> f32 {
        match layer_type {
            LayerType::Line => self.line_scale,
            LayerType::Symbol => self.text_scale,
            LayerType::Circle => self.marker_scale,
            _ => 1.0,
        }
    }

    /// Settings for vector content drawn over a raster background.
    ///
    /// Every layer lands above [`IMAGE_LAYER_DRAW_PRIORITY`].
    pub fn above_raster(&self) -> Self {
        Self {
            base_draw_priority: self
                .base_draw_priority
                .max(0)
                .saturating_add(IMAGE_LAYER_DRAW_PRIORITY + VECTOR_OVERLAY_PRIORITY_OFFSET),
            ..self.clone()
        }
    }
}

/// Layers a hybrid pipeline pre-renders into its raster background.
pub fn polygon_background_filter() -> LayerFilter {
    Arc::new(|layer: &StyleLayer| layer.layer_type.is_polygon_background())
}

/// The complement of [`polygon_background_filter`].
pub fn vector_overlay_filter() -> LayerFilter {
    Arc::new(|layer: &StyleLayer| !layer.layer_type.is_polygon_background())
}

/// Turns style bytes into a [`StyleDocument`].
///
/// The optional filter restricts which layers are materialized; the
/// pipeline selector uses it to split raster-background and vector-overlay
/// interpretations of the same style.
pub trait StyleResolver: Send + Sync {
    fn parse(
        &self,
        data: &[u8],
        settings: &StyleSettings,
        presentation: Presentation,
        filter: Option<&LayerFilter>,
    ) -> Result<StyleDocument, StyleError>;
}

/// [`StyleResolver`] for Mapbox GL style JSON.
#[derive(Clone, Default)]
pub struct JsonStyleResolver {
    font_override: Option<FontOverride>,
}

impl JsonStyleResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve symbol-layer fonts through `font_override`.
    pub fn with_font_override(mut self, font_override: FontOverride) -> Self {
        self.font_override = Some(font_override);
        self
    }
}

impl StyleResolver for JsonStyleResolver {
    fn parse(
        &self,
        data: &[u8],
        settings: &StyleSettings,
        presentation: Presentation,
        filter: Option<&LayerFilter>,
    ) -> Result<StyleDocument, StyleError> {
        parse_style(
            data,
            settings,
            presentation,
            filter,
            self.font_override.as_ref(),
        )
    }
}

impl fmt::Debug for JsonStyleResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonStyleResolver")
            .field("font_override", &self.font_override.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::LayerType;

    const STYLE: &[u8] = br#"{
        "version": 8,
        "sources": {},
        "layers": [
            {"id": "bg", "type": "background"},
            {"id": "land", "type": "fill"},
            {"id": "roads", "type": "line"},
            {"id": "labels", "type": "symbol"}
        ]
    }"#;

    #[test]
    fn test_draw_priority_steps() {
        let settings = StyleSettings {
            base_draw_priority: 10,
            draw_priority_per_level: 5,
            ..StyleSettings::default()
        };
        assert_eq!(settings.draw_priority_for(0), 10);
        assert_eq!(settings.draw_priority_for(3), 25);
    }

    #[test]
    fn test_above_raster_lifts_every_layer() {
        let settings = StyleSettings::default().above_raster();
        assert!(settings.draw_priority_for(0) > IMAGE_LAYER_DRAW_PRIORITY);
        assert_eq!(settings.line_scale, 1.0);
    }

    #[test]
    fn test_filters_split_layers() {
        let resolver = JsonStyleResolver::new();
        let settings = StyleSettings::default();

        let raster = resolver
            .parse(STYLE, &settings, Presentation::Flat, Some(&polygon_background_filter()))
            .unwrap();
        let vector = resolver
            .parse(STYLE, &settings, Presentation::Flat, Some(&vector_overlay_filter()))
            .unwrap();

        let raster_types: Vec<_> = raster.layers.iter().map(|l| l.layer_type).collect();
        let vector_types: Vec<_> = vector.layers.iter().map(|l| l.layer_type).collect();
        assert_eq!(raster_types, vec![LayerType::Background, LayerType::Fill]);
        assert_eq!(vector_types, vec![LayerType::Line, LayerType::Symbol]);
    }

    #[test]
    fn test_unfiltered_parse_keeps_all_layers() {
        let doc = JsonStyleResolver::new()
            .parse(STYLE, &StyleSettings::default(), Presentation::Flat, None)
            .unwrap();
        assert_eq!(doc.layers.len(), 4);
    }

    #[test]
    fn test_layer_scales_follow_layer_type() {
        let settings = StyleSettings {
            line_scale: 2.0,
            text_scale: 1.5,
            marker_scale: 0.5,
            ..StyleSettings::default()
        };
        let doc = JsonStyleResolver::new()
            .parse(STYLE, &settings, Presentation::Flat, None)
            .unwrap();

        let scale = |id: &str| doc.layer_by_id(id).unwrap().size_scale;
        assert_eq!(scale("bg"), 1.0);
        assert_eq!(scale("roads"), 2.0);
        assert_eq!(scale("labels"), 1.5);
        assert_eq!(settings.scale_for(LayerType::Circle), 0.5);
    }
}
