//! CLI error handling with user-friendly messages.
//!
//! Centralizes error formatting and exit codes for all commands.

use std::fmt;
use std::process;
use stylekit::config::ConfigFileError;
use stylekit::session::SessionError;
use stylekit::transport::TransportError;

/// CLI-specific errors.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Failed to build the resource transport
    Transport(TransportError),
    /// The session could not attach a pipeline
    Session(SessionError),
    /// Failed to start the async runtime
    Runtime(std::io::Error),
}

impl CliError {
    /// Exit code: 2 for configuration problems, 3 for session failures.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) => 2,
            CliError::Session(SessionError::Configuration(_)) => 2,
            CliError::Session(_) => 3,
            _ => 1,
        }
    }

    /// Exit the process with an error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Session(SessionError::Transport { .. }) => {
                eprintln!();
                eprintln!("Check that the style URL is reachable, or point --cache-dir at a");
                eprintln!("cache populated by an earlier run.");
            }
            CliError::Session(SessionError::Configuration(_)) | CliError::Config(_) => {
                eprintln!();
                eprintln!("Set the style with --style or in the [style] section of the config file.");
                eprintln!("Use 'stylekit config path' to locate the config file.");
            }
            _ => {}
        }

        process::exit(self.exit_code())
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Transport(e) => write!(f, "Failed to create transport: {}", e),
            CliError::Session(e) => write!(f, "Session failed: {}", e),
            CliError::Runtime(e) => write!(f, "Failed to start runtime: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Transport(e) => Some(e),
            CliError::Session(e) => Some(e),
            CliError::Runtime(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<SessionError> for CliError {
    fn from(e: SessionError) -> Self {
        CliError::Session(e)
    }
}

impl From<TransportError> for CliError {
    fn from(e: TransportError) -> Self {
        CliError::Transport(e)
    }
}
