//! Configuration file handling for ~/.stylekit/config.ini.

use super::session::SessionConfig;
use super::settings::ConfigFile;
use crate::pipeline::PipelineOptions;
use crate::style::StyleSettings;
use ini::Ini;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Failed to write config file
    #[error("Failed to write config file: {0}")]
    WriteError(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    /// Failed to create config directory
    #[error("Failed to create config directory: {0}")]
    DirectoryError(std::io::Error),
}

impl ConfigFile {
    /// Load configuration from the default path.
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from a specific path.
    ///
    /// A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigFileError::DirectoryError)?;
        }

        let content = super::writer::to_config_string(self);
        std::fs::write(path, content).map_err(|e| ConfigFileError::WriteError(e.to_string()))
    }

    /// Session configuration for the configured style.
    pub fn session_config(&self) -> SessionConfig {
        let mut config = SessionConfig::new().with_pipeline(PipelineOptions {
            hybrid_mode: self.pipeline.hybrid,
            background_polygons_to_raster: self.pipeline.background_to_raster,
            settings: StyleSettings {
                base_draw_priority: self.render.base_draw_priority,
                draw_priority_per_level: self.render.draw_priority_per_level,
                line_scale: self.render.line_scale,
                text_scale: self.render.text_scale,
                marker_scale: self.render.marker_scale,
            },
        });
        if let Some(url) = &self.style.url {
            config = config.with_style_url(url.clone());
        }
        if self.cache.enabled {
            config = config.with_cache_root(self.cache.directory.clone());
        }
        config
    }
}

/// Path to the config directory (~/.stylekit).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(super::defaults::CONFIG_DIR_NAME)
}

/// Path to the config file (~/.stylekit/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}
