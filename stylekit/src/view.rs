//! Map view collaborator.
//!
//! The session attaches the pipeline it builds to a [`MapView`] and detaches
//! it again on teardown. Everything else about the view (camera, gestures,
//! frame loop) belongs to the host application.

use crate::style::Color;
use std::fmt;

/// How the target view presents the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Presentation {
    /// Whole-earth globe. Raster loading covers the poles and matches edges.
    Globe,
    /// Flat, pannable map.
    #[default]
    Flat,
}

impl Presentation {
    /// Returns true for full-globe views.
    pub fn is_globe(&self) -> bool {
        matches!(self, Self::Globe)
    }
}

impl fmt::Display for Presentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Globe => write!(f, "globe"),
            Self::Flat => write!(f, "flat"),
        }
    }
}

/// Identifier of a loader or layer attached to a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub u64);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer-{}", self.0)
    }
}

/// The view a session builds its pipeline for.
pub trait MapView: Send + Sync {
    /// Globe or flat-map presentation.
    fn presentation(&self) -> Presentation;

    /// Attaches a loader or layer to the view.
    fn add(&self, layer: LayerId);

    /// Detaches a previously attached loader or layer.
    fn remove(&self, layer: LayerId);

    /// Sets the color the view clears to before drawing.
    fn set_clear_color(&self, color: Color);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presentation_default_is_flat() {
        assert_eq!(Presentation::default(), Presentation::Flat);
        assert!(!Presentation::Flat.is_globe());
        assert!(Presentation::Globe.is_globe());
    }

    #[test]
    fn test_layer_id_display() {
        assert_eq!(LayerId(7).to_string(), "layer-7");
    }
}
