//! Configuration.
//!
//! [`SessionConfig`] is the builder a host uses to configure one session.
//! [`ConfigFile`] loads the same knobs from `~/.stylekit/config.ini` for
//! the CLI:
//!
//! ```ini
//! [style]
//! url = https://tiles.example.com/style.json
//!
//! [pipeline]
//! hybrid = true
//! background_to_raster = true
//! ```

mod defaults;
mod file;
mod parser;
mod session;
mod settings;
mod writer;

pub use defaults::{
    default_cache_directory, CACHE_DIR_NAME, CONFIG_DIR_NAME, DEFAULT_BASE_DRAW_PRIORITY,
    DEFAULT_DRAW_PRIORITY_PER_LEVEL, DEFAULT_FETCH_TIMEOUT_SECS,
};
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use session::SessionConfig;
pub use settings::{
    CacheSettings, ConfigFile, FetchSettings, LoggingSettings, PipelineSettings, RenderSettings,
    StyleSettingsSection,
};
