//! Pipeline selection and assembly.
//!
//! Once every source of a style is resolved, the selector picks between a
//! hybrid raster+vector pipeline and the legacy paging pipeline, builds it,
//! and attaches it to the view. A failed build leaves nothing attached.

use super::descriptor::{HybridPipeline, PagingPipeline, PipelineDescriptor};
use super::interpreter::{HybridInterpreter, OfflineBackground, PagingDelegate};
use super::traits::{OfflineRenderer, PipelineBackend};
use super::types::{
    zoom_union, PagingLayerConfig, SamplingParams, TileSource, TileSourceKind, ZoomRange,
    OFFLINE_TILE_SIZE,
};
use crate::session::SessionError;
use crate::style::{
    polygon_background_filter, vector_overlay_filter, LayerFilter, Source, Sprites,
    StyleDocument, StyleResolver, StyleSettings,
};
use crate::view::MapView;
use std::sync::Arc;
use tracing::{debug, info};

/// Knobs deciding which pipeline gets built.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    /// Build the hybrid pipeline instead of the paging one.
    pub hybrid_mode: bool,
    /// In hybrid mode, pre-render background and fill layers offline.
    pub background_polygons_to_raster: bool,
    /// Render settings for every style interpretation.
    pub settings: StyleSettings,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            hybrid_mode: true,
            background_polygons_to_raster: true,
            settings: StyleSettings::default(),
        }
    }
}

/// Builds the pipeline for a fully resolved style.
pub struct PipelineSelector<'a> {
    resolver: &'a dyn StyleResolver,
    backend: &'a PipelineBackend,
    options: &'a PipelineOptions,
}

impl<'a> PipelineSelector<'a> {
    pub fn new(
        resolver: &'a dyn StyleResolver,
        backend: &'a PipelineBackend,
        options: &'a PipelineOptions,
    ) -> Self {
        Self {
            resolver,
            backend,
            options,
        }
    }

    /// Builds and attaches a pipeline for `style`.
    ///
    /// `style_bytes` is the raw style the document was parsed from. The
    /// hybrid path re-interprets it with layer filters.
    pub fn select(
        &self,
        style_bytes: &[u8],
        style: &StyleDocument,
        sprites: Arc<Sprites>,
    ) -> Result<PipelineDescriptor, SessionError> {
        let view = self
            .backend
            .view
            .as_deref()
            .ok_or_else(|| SessionError::Configuration("no target view".to_string()))?;

        let range = zoom_union(&style.sources).ok_or_else(|| {
            SessionError::Configuration("no source provides a zoom range".to_string())
        })?;

        // Only the first source feeds the pipeline.
        let first = style
            .sources
            .first()
            .ok_or_else(|| SessionError::Configuration("style declares no sources".to_string()))?;

        info!(
            hybrid = self.options.hybrid_mode,
            zoom = %range,
            source = %first.name,
            sources = style.sources.len(),
            "Selecting pipeline"
        );

        if self.options.hybrid_mode {
            self.build_hybrid(view, style_bytes, style, first, range, sprites)
        } else {
            self.build_paging(view, style, first, range, sprites)
        }
    }

    fn build_hybrid(
        &self,
        view: &dyn MapView,
        style_bytes: &[u8],
        style: &StyleDocument,
        first: &Source,
        range: ZoomRange,
        sprites: Arc<Sprites>,
    ) -> Result<PipelineDescriptor, SessionError> {
        let engine = self.backend.raster_engine.as_ref().ok_or_else(|| {
            SessionError::PipelineConstruction("no raster tile engine".to_string())
        })?;
        let source = resolved_source(first, TileSourceKind::Raster)?;
        let sampling = SamplingParams::hybrid(range, style.presentation);

        let (background, renderer) = if self.options.background_polygons_to_raster {
            let renderer = self.backend.renderer.clone().ok_or_else(|| {
                SessionError::PipelineConstruction("no offline renderer".to_string())
            })?;
            let background = self.render_background(renderer.as_ref(), style_bytes, style)?;
            (Some(background), Some(renderer))
        } else {
            (None, None)
        };

        let release = |background: &Option<OfflineBackground>| {
            if let (Some(renderer), Some(background)) = (&renderer, background) {
                renderer.release(background.target);
            }
        };

        // With no raster background the overlay has to carry the polygons too.
        let overlay_filter = background.as_ref().map(|_| vector_overlay_filter());
        let overlay = match self.interpret(
            style_bytes,
            style,
            &self.options.settings.above_raster(),
            overlay_filter.as_ref(),
        ) {
            Ok(overlay) => overlay,
            Err(e) => {
                release(&background);
                return Err(e);
            }
        };

        let interpreter = Arc::new(HybridInterpreter::new(background.clone(), overlay, sprites));
        let loader = match engine.start(&sampling, std::slice::from_ref(&source), interpreter.clone())
        {
            Ok(loader) => loader,
            Err(e) => {
                release(&background);
                return Err(e.into());
            }
        };

        view.add(loader.id());
        info!(
            layer = %loader.id(),
            zoom = %range,
            offline_background = background.is_some(),
            "Hybrid pipeline attached"
        );

        Ok(PipelineDescriptor::Hybrid(HybridPipeline {
            sampling,
            sources: vec![source],
            interpreter,
            loader,
            renderer,
        }))
    }

    fn render_background(
        &self,
        renderer: &dyn OfflineRenderer,
        style_bytes: &[u8],
        style: &StyleDocument,
    ) -> Result<OfflineBackground, SessionError> {
        let filter = polygon_background_filter();
        let background_style =
            self.interpret(style_bytes, style, &self.options.settings, Some(&filter))?;
        let target = renderer.render(&background_style, OFFLINE_TILE_SIZE)?;
        debug!(
            target = target.id,
            layers = background_style.layers.len(),
            "Rendered offline background"
        );
        Ok(OfflineBackground {
            style: background_style,
            target,
        })
    }

    fn build_paging(
        &self,
        view: &dyn MapView,
        style: &StyleDocument,
        first: &Source,
        range: ZoomRange,
        sprites: Arc<Sprites>,
    ) -> Result<PipelineDescriptor, SessionError> {
        let engine = self.backend.paging_engine.as_ref().ok_or_else(|| {
            SessionError::PipelineConstruction("no paging engine".to_string())
        })?;
        let source = resolved_source(first, TileSourceKind::LegacyVector)?;
        let config = PagingLayerConfig::new(range);
        let delegate = Arc::new(PagingDelegate::new(style.clone(), sprites));

        let layer = engine.create_layer(&config, &source, delegate.clone())?;
        view.add(layer.id());

        let clear_color = style.background_color();
        if let Some(color) = clear_color {
            view.set_clear_color(color);
        }
        info!(layer = %layer.id(), zoom = %range, "Paging pipeline attached");

        Ok(PipelineDescriptor::Paging(PagingPipeline {
            config,
            source,
            delegate,
            clear_color,
            layer,
        }))
    }

    /// Re-parses the style with a filter, carrying over the tile-specs that
    /// were fetched for the session's document.
    fn interpret(
        &self,
        style_bytes: &[u8],
        resolved: &StyleDocument,
        settings: &StyleSettings,
        filter: Option<&LayerFilter>,
    ) -> Result<StyleDocument, SessionError> {
        let mut doc = self
            .resolver
            .parse(style_bytes, settings, resolved.presentation, filter)
            .map_err(|e| SessionError::PipelineConstruction(format!("style interpretation: {}", e)))?;
        for source in &mut doc.sources {
            if let Some(spec) = resolved.source(&source.name).and_then(|s| s.tile_spec.clone()) {
                source.tile_spec = Some(spec);
            }
        }
        Ok(doc)
    }
}

fn resolved_source(source: &Source, kind: TileSourceKind) -> Result<TileSource, SessionError> {
    TileSource::from_source(source, kind).ok_or_else(|| {
        SessionError::Configuration(format!("source '{}' has no tile-spec", source.name))
    })
}
