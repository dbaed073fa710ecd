//! CLI runner: config loading and logging setup shared by commands.

use crate::error::CliError;
use std::path::Path;
use stylekit::config::{config_file_path, ConfigFile};
use stylekit::logging::{init_logging, LoggingGuard, LoggingOptions};
use tracing::info;

/// Keeps logging alive and holds the loaded configuration.
pub struct CliRunner {
    _logging_guard: LoggingGuard,
    config: ConfigFile,
}

impl CliRunner {
    /// Load config from `config_path` (or the default path) and start
    /// logging to the configured file.
    ///
    /// Debug mode forces debug-level logging and mirrors it to stdout.
    pub fn new(config_path: Option<&Path>, debug_mode: bool) -> Result<Self, CliError> {
        let config = match config_path {
            Some(path) => ConfigFile::load_from(path)?,
            None => ConfigFile::load_from(&config_file_path())?,
        };

        let options = LoggingOptions {
            stdout: debug_mode,
            debug: debug_mode,
        };
        let logging_guard = init_logging(&config.logging.file, &options)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            _logging_guard: logging_guard,
            config,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!(version = stylekit::VERSION, command, "stylekit starting");
    }
}
