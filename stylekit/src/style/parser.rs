//! Style, TileJSON and font-stack parsing.

use super::color::Color;
use super::resolver::{FontOverride, LayerFilter, StyleError, StyleSettings};
use super::types::{
    FontBinding, LayerPaint, LayerType, Source, SourceKind, StyleDocument, StyleLayer, TileSpec,
    DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM,
};
use crate::view::Presentation;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// The only style format version this parser accepts.
const SUPPORTED_VERSION: u32 = 8;

#[derive(Deserialize)]
struct RawStyle {
    #[serde(default)]
    version: u32,
    #[serde(default)]
    name: String,
    #[serde(default)]
    sources: serde_json::Map<String, Value>,
    #[serde(default)]
    layers: Vec<RawLayer>,
    #[serde(default)]
    sprite: Option<Value>,
    #[serde(default)]
    glyphs: Option<String>,
}

#[derive(Deserialize)]
struct RawSource {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    tiles: Option<Vec<String>>,
    #[serde(default)]
    minzoom: Option<u8>,
    #[serde(default)]
    maxzoom: Option<u8>,
}

#[derive(Deserialize)]
struct RawLayer {
    id: String,
    #[serde(rename = "type")]
    layer_type: String,
    #[serde(default)]
    source: Option<String>,
    #[serde(rename = "source-layer", default)]
    source_layer: Option<String>,
    #[serde(default)]
    minzoom: Option<f32>,
    #[serde(default)]
    maxzoom: Option<f32>,
    #[serde(default)]
    layout: RawLayout,
    #[serde(default)]
    paint: RawPaint,
}

#[derive(Deserialize, Default)]
struct RawLayout {
    #[serde(default)]
    visibility: Option<String>,
    #[serde(rename = "text-font", default)]
    text_font: Option<Value>,
    #[serde(rename = "icon-image", default)]
    icon_image: Option<Value>,
}

#[derive(Deserialize, Default)]
struct RawPaint {
    #[serde(rename = "background-color", default)]
    background_color: Option<Value>,
    #[serde(rename = "fill-color", default)]
    fill_color: Option<Value>,
}

/// Parse style bytes into a [`StyleDocument`].
///
/// Layers are assigned draw priorities from their position in the full
/// layer list before `filter` runs, so a filtered interpretation keeps the
/// priorities the unfiltered one would have used.
pub fn parse_style(
    data: &[u8],
    settings: &StyleSettings,
    presentation: Presentation,
    filter: Option<&LayerFilter>,
    font_override: Option<&FontOverride>,
) -> Result<StyleDocument, StyleError> {
    let raw: RawStyle = serde_json::from_slice(data)?;

    if raw.version != SUPPORTED_VERSION {
        return Err(StyleError::Invalid(format!(
            "Unsupported style version: {} (expected {})",
            raw.version, SUPPORTED_VERSION
        )));
    }

    let sources = raw
        .sources
        .into_iter()
        .map(|(name, value)| parse_source(name, value))
        .collect::<Result<Vec<_>, _>>()?;

    let mut layers: Vec<StyleLayer> = raw
        .layers
        .into_iter()
        .enumerate()
        .map(|(index, layer)| convert_layer(layer, index, settings))
        .collect();

    if let Some(filter) = filter {
        layers.retain(|layer| filter(layer));
    }

    let fonts = resolve_fonts(&layers, font_override);

    Ok(StyleDocument {
        name: raw.name,
        version: raw.version,
        sources,
        layers,
        sprite: raw.sprite.as_ref().and_then(sprite_base),
        glyphs: raw.glyphs,
        fonts,
        presentation,
    })
}

/// Parse a TileJSON document into a [`TileSpec`].
pub fn parse_tile_spec(data: &[u8]) -> Result<TileSpec, StyleError> {
    let spec: TileSpec = serde_json::from_slice(data)?;
    validate_tile_spec(&spec)?;
    Ok(spec)
}

fn validate_tile_spec(spec: &TileSpec) -> Result<(), StyleError> {
    if spec.tiles.is_empty() {
        return Err(StyleError::TileSpec("no tile URL templates".to_string()));
    }
    if spec.min_zoom > spec.max_zoom {
        return Err(StyleError::TileSpec(format!(
            "minzoom {} above maxzoom {}",
            spec.min_zoom, spec.max_zoom
        )));
    }
    Ok(())
}

fn parse_source(name: String, value: Value) -> Result<Source, StyleError> {
    let raw: RawSource = serde_json::from_value(value)
        .map_err(|e| StyleError::Invalid(format!("source '{}': {}", name, e)))?;

    let tile_spec = match raw.tiles {
        Some(tiles) if !tiles.is_empty() => {
            let spec = TileSpec::new(
                raw.minzoom.unwrap_or(DEFAULT_MIN_ZOOM),
                raw.maxzoom.unwrap_or(DEFAULT_MAX_ZOOM),
                tiles,
            );
            validate_tile_spec(&spec)
                .map_err(|e| StyleError::Invalid(format!("source '{}': {}", name, e)))?;
            Some(spec)
        }
        _ => None,
    };

    Ok(Source {
        kind: SourceKind::from_type(&raw.kind),
        url: raw.url.filter(|u| !u.trim().is_empty()),
        tile_spec,
        name,
    })
}

fn convert_layer(raw: RawLayer, index: usize, settings: &StyleSettings) -> StyleLayer {
    let text_font = match raw.layout.text_font {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    };

    let layer_type = LayerType::from_type(&raw.layer_type);

    StyleLayer {
        size_scale: settings.scale_for(layer_type),
        layer_type,
        source: raw.source,
        source_layer: raw.source_layer,
        min_zoom: raw.minzoom,
        max_zoom: raw.maxzoom,
        visible: raw.layout.visibility.as_deref() != Some("none"),
        text_font,
        icon_image: raw
            .layout
            .icon_image
            .as_ref()
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .map(str::to_string),
        paint: LayerPaint {
            background_color: raw.paint.background_color.as_ref().and_then(literal_color),
            fill_color: raw.paint.fill_color.as_ref().and_then(literal_color),
        },
        draw_priority: settings.draw_priority_for(index),
        id: raw.id,
    }
}

fn literal_color(value: &Value) -> Option<Color> {
    value.as_str().and_then(Color::parse)
}

/// Newer styles allow an array of `{id, url}` sprites; the first one is the
/// default sprite.
fn sprite_base(value: &Value) -> Option<String> {
    match value {
        Value::String(url) if !url.trim().is_empty() => Some(url.clone()),
        Value::Array(entries) => entries
            .first()
            .and_then(|e| e.get("url"))
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

fn resolve_fonts(layers: &[StyleLayer], font_override: Option<&FontOverride>) -> Vec<FontBinding> {
    let Some(lookup) = font_override else {
        return Vec::new();
    };

    let mut seen: Vec<&str> = Vec::new();
    let mut bindings = Vec::new();
    for name in layers
        .iter()
        .filter(|l| l.layer_type == LayerType::Symbol)
        .flat_map(|l| l.text_font.iter())
    {
        if seen.contains(&name.as_str()) {
            continue;
        }
        seen.push(name);

        match lookup(name) {
            Some(descriptor) => bindings.push(FontBinding {
                name: name.clone(),
                descriptor,
            }),
            None => debug!(font = %name, "No font override for style font"),
        }
    }
    bindings
}
