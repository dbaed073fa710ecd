//! Default values for configuration settings and `ConfigFile::default()`.

use super::settings::*;
use std::path::PathBuf;

/// Default HTTP timeout for resource fetches, in seconds.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Default draw priority of the first style layer.
pub const DEFAULT_BASE_DRAW_PRIORITY: i32 = 0;

/// Default draw priority step between layers.
pub const DEFAULT_DRAW_PRIORITY_PER_LEVEL: i32 = 1;

/// Name of the configuration directory under the home directory.
pub const CONFIG_DIR_NAME: &str = ".stylekit";

/// Name of the cache directory under the platform cache directory.
pub const CACHE_DIR_NAME: &str = "stylekit";

/// Platform cache directory for fetched resources.
pub fn default_cache_directory() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CACHE_DIR_NAME)
}

impl Default for ConfigFile {
    fn default() -> Self {
        let config_dir = super::file::config_directory();

        Self {
            style: StyleSettingsSection { url: None },
            cache: CacheSettings {
                enabled: true,
                directory: default_cache_directory(),
            },
            fetch: FetchSettings {
                timeout: DEFAULT_FETCH_TIMEOUT_SECS,
            },
            pipeline: PipelineSettings {
                hybrid: true,
                background_to_raster: true,
            },
            render: RenderSettings {
                base_draw_priority: DEFAULT_BASE_DRAW_PRIORITY,
                draw_priority_per_level: DEFAULT_DRAW_PRIORITY_PER_LEVEL,
                line_scale: 1.0,
                text_scale: 1.0,
                marker_scale: 1.0,
            },
            logging: LoggingSettings {
                file: config_dir.join("stylekit.log"),
            },
        }
    }
}
