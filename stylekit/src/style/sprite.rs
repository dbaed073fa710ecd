//! Sprite sheet metadata and atlas decoding.
//!
//! A style's `sprite` property is a base URL. The high-DPI resources live
//! next to it:
//! - `{sprite}@2x.json` - icon positions
//! - `{sprite}@2x.png` - the atlas image

use super::resolver::StyleError;
use serde::Deserialize;
use std::collections::HashMap;
use url::Url;

/// Suffix of the sprite metadata resource.
pub const SPRITE_JSON_SUFFIX: &str = "@2x.json";

/// Suffix of the sprite atlas image.
pub const SPRITE_PNG_SUFFIX: &str = "@2x.png";

/// The two resources derived from a sprite base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteUrls {
    pub json: String,
    pub png: String,
}

impl SpriteUrls {
    /// Derive the metadata and image URLs from a sprite base.
    ///
    /// The suffix goes on the path, ahead of any query string, so
    /// `https://x/sprite?token=a` becomes `https://x/sprite@2x.json?token=a`.
    pub fn from_base(base: &str) -> Self {
        Self {
            json: with_suffix(base, SPRITE_JSON_SUFFIX),
            png: with_suffix(base, SPRITE_PNG_SUFFIX),
        }
    }
}

fn with_suffix(base: &str, suffix: &str) -> String {
    match Url::parse(base) {
        Ok(mut url) if url.query().is_some() && !url.cannot_be_a_base() => {
            let path = format!("{}{}", url.path(), suffix);
            url.set_path(&path);
            url.to_string()
        }
        _ => format!("{}{}", base, suffix),
    }
}

/// A single icon in the sprite atlas.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpriteEntry {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    #[serde(rename = "pixelRatio", default = "default_pixel_ratio")]
    pub pixel_ratio: f32,
    #[serde(default)]
    pub sdf: bool,
}

fn default_pixel_ratio() -> f32 {
    1.0
}

/// Parsed `@2x.json` sprite metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpriteSheet {
    pub entries: HashMap<String, SpriteEntry>,
}

impl SpriteSheet {
    /// Parse sprite metadata JSON.
    pub fn parse(data: &[u8]) -> Result<Self, StyleError> {
        let entries: HashMap<String, SpriteEntry> = serde_json::from_slice(data)?;
        Ok(Self { entries })
    }

    pub fn get(&self, name: &str) -> Option<&SpriteEntry> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Decoded sprite atlas image.
#[derive(Debug, Clone)]
pub struct SpriteAtlas {
    pub width: u32,
    pub height: u32,
    /// RGBA8 pixels, row-major.
    pub pixels: Vec<u8>,
}

impl SpriteAtlas {
    /// Decode a PNG atlas.
    pub fn decode(data: &[u8]) -> Result<Self, StyleError> {
        let image = image::load_from_memory_with_format(data, image::ImageFormat::Png)
            .map_err(|e| StyleError::Sprite(format!("atlas decode failed: {}", e)))?
            .to_rgba8();

        Ok(Self {
            width: image.width(),
            height: image.height(),
            pixels: image.into_raw(),
        })
    }

    /// Returns true if `entry` lies entirely inside the atlas.
    pub fn contains(&self, entry: &SpriteEntry) -> bool {
        entry.x.saturating_add(entry.width) <= self.width
            && entry.y.saturating_add(entry.height) <= self.height
    }
}

/// Sprite payloads fetched for a session. Either half may be missing if
/// the style declares no sprite.
#[derive(Debug, Clone, Default)]
pub struct Sprites {
    pub sheet: Option<SpriteSheet>,
    pub atlas: Option<SpriteAtlas>,
}

impl Sprites {
    /// Looks up an icon, returning it only if the atlas holds its pixels.
    pub fn icon(&self, name: &str) -> Option<&SpriteEntry> {
        let entry = self.sheet.as_ref()?.get(name)?;
        match &self.atlas {
            Some(atlas) if atlas.contains(entry) => Some(entry),
            _ => None,
        }
    }
}
