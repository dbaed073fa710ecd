//! Logging setup for stylekit tools.
//!
//! - Writes to a log file (truncated at startup)
//! - Optionally mirrors to stdout
//! - `RUST_LOG` wins; otherwise `info`, or `debug` when requested

use std::fs;
use std::io;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping it flushes and closes the log file writer.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Logging options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingOptions {
    /// Also print to stdout.
    pub stdout: bool,
    /// Default to `debug` instead of `info` when `RUST_LOG` is unset.
    pub debug: bool,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            stdout: true,
            debug: false,
        }
    }
}

/// Initialize logging to `log_file`, clearing any previous content.
///
/// # Errors
///
/// Returns an error if the log directory cannot be created or the log file
/// cannot be truncated.
pub fn init_logging(log_file: &Path, options: &LoggingOptions) -> Result<LoggingGuard, io::Error> {
    let (dir, name) = split_log_path(log_file)?;
    fs::create_dir_all(&dir)?;
    fs::write(log_file, "")?;

    let file_appender = tracing_appender::rolling::never(&dir, &name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_target(true);

    let stdout_layer = options.stdout.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(io::stdout)
            .with_ansi(true)
            .compact()
    });

    tracing_subscriber::registry()
        .with(default_filter(options.debug))
        .with(file_layer)
        .with(stdout_layer)
        .init();

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

fn default_filter(debug: bool) -> EnvFilter {
    let level = if debug { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

fn split_log_path(log_file: &Path) -> Result<(std::path::PathBuf, std::ffi::OsString), io::Error> {
    let name = log_file.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("log path has no file name: {}", log_file.display()),
        )
    })?;
    let dir = match log_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::path::PathBuf::from("."),
    };
    Ok((dir, name.to_os_string()))
}
