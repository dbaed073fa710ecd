//! Session configuration.

use crate::locator::{FileOverride, ResourceLocator};
use crate::pipeline::PipelineOptions;
use crate::style::{FontOverride, StyleSettings};
use std::fmt;
use std::path::{Path, PathBuf};

/// Configuration of a [`StyleSession`](crate::session::StyleSession).
///
/// # Example
///
/// ```
/// use stylekit::config::SessionConfig;
///
/// let config = SessionConfig::new()
///     .with_style_url("https://tiles.example.com/style.json")
///     .with_cache_root("/tmp/stylekit-cache")
///     .with_hybrid_mode(false);
///
/// assert_eq!(config.style_url(), Some("https://tiles.example.com/style.json"));
/// assert!(!config.pipeline().hybrid_mode);
/// ```
#[derive(Clone, Default)]
pub struct SessionConfig {
    style_url: Option<String>,
    cache_root: Option<PathBuf>,
    file_override: Option<FileOverride>,
    font_override: Option<FontOverride>,
    pipeline: PipelineOptions,
}

impl SessionConfig {
    /// Defaults: no style, no cache, hybrid mode with offline background.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_style_url(mut self, url: impl Into<String>) -> Self {
        self.style_url = Some(url.into());
        self
    }

    /// Cache fetched resources under `root`.
    pub fn with_cache_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.cache_root = Some(root.into());
        self
    }

    pub fn without_cache(mut self) -> Self {
        self.cache_root = None;
        self
    }

    /// Rewrite every resource URL before it is resolved or fetched.
    pub fn with_file_override(mut self, file_override: FileOverride) -> Self {
        self.file_override = Some(file_override);
        self
    }

    /// Resolve style font names through `font_override`.
    pub fn with_font_override(mut self, font_override: FontOverride) -> Self {
        self.font_override = Some(font_override);
        self
    }

    pub fn with_hybrid_mode(mut self, hybrid: bool) -> Self {
        self.pipeline.hybrid_mode = hybrid;
        self
    }

    pub fn with_background_polygons_to_raster(mut self, enabled: bool) -> Self {
        self.pipeline.background_polygons_to_raster = enabled;
        self
    }

    pub fn with_render_settings(mut self, settings: StyleSettings) -> Self {
        self.pipeline.settings = settings;
        self
    }

    pub fn with_pipeline(mut self, pipeline: PipelineOptions) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// The style URL, if set and not blank.
    pub fn style_url(&self) -> Option<&str> {
        self.style_url.as_deref().filter(|u| !u.trim().is_empty())
    }

    pub fn cache_root(&self) -> Option<&Path> {
        self.cache_root.as_deref()
    }

    pub fn font_override(&self) -> Option<&FontOverride> {
        self.font_override.as_ref()
    }

    pub fn pipeline(&self) -> &PipelineOptions {
        &self.pipeline
    }

    /// A locator over the configured cache root and override.
    pub fn locator(&self) -> ResourceLocator {
        let locator = ResourceLocator::new(self.cache_root.clone());
        match &self.file_override {
            Some(hook) => locator.with_override(hook.clone()),
            None => locator,
        }
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("style_url", &self.style_url)
            .field("cache_root", &self.cache_root)
            .field("file_override", &self.file_override.is_some())
            .field("font_override", &self.font_override.is_some())
            .field("pipeline", &self.pipeline)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::new();
        assert!(config.style_url().is_none());
        assert!(config.cache_root().is_none());
        assert!(config.pipeline().hybrid_mode);
        assert!(config.pipeline().background_polygons_to_raster);
    }

    #[test]
    fn test_blank_style_url_counts_as_missing() {
        let config = SessionConfig::new().with_style_url("  ");
        assert!(config.style_url().is_none());
    }

    #[test]
    fn test_locator_carries_override() {
        let config = SessionConfig::new()
            .with_file_override(Arc::new(|url: &str| url.replace("remote://", "/srv/")));
        assert_eq!(config.locator().rewrite("remote://a.json"), "/srv/a.json");
    }
}
