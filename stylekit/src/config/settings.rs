//! Settings structs for the sections of `config.ini`.

use std::path::PathBuf;

/// Complete configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub style: StyleSettingsSection,
    pub cache: CacheSettings,
    pub fetch: FetchSettings,
    pub pipeline: PipelineSettings,
    pub render: RenderSettings,
    pub logging: LoggingSettings,
}

/// `[style]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSettingsSection {
    /// Style document URL or path.
    pub url: Option<String>,
}

/// `[cache]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSettings {
    /// Cache fetched resources on disk.
    pub enabled: bool,
    /// Cache root directory.
    pub directory: PathBuf,
}

/// `[fetch]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchSettings {
    /// HTTP timeout in seconds.
    pub timeout: u64,
}

/// `[pipeline]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    /// Build the hybrid raster+vector pipeline.
    pub hybrid: bool,
    /// Pre-render background and fill layers in hybrid mode.
    pub background_to_raster: bool,
}

/// `[render]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    pub base_draw_priority: i32,
    pub draw_priority_per_level: i32,
    pub line_scale: f32,
    pub text_scale: f32,
    pub marker_scale: f32,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Log file path.
    pub file: PathBuf,
}
