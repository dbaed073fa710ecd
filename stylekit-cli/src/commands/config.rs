//! Configuration file commands.

use crate::error::CliError;
use clap::Subcommand;
use std::path::{Path, PathBuf};
use stylekit::config::{config_file_path, ConfigFile};

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the configuration file path
    Path,

    /// Print the effective configuration
    Show,

    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run a config subcommand against `config_path` or the default path.
pub fn run(command: ConfigCommands, config_path: Option<&Path>) -> Result<(), CliError> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(config_file_path);

    match command {
        ConfigCommands::Path => {
            println!("{}", path.display());
            Ok(())
        }
        ConfigCommands::Show => run_show(&path),
        ConfigCommands::Init { force } => run_init(path, force),
    }
}

fn run_show(path: &Path) -> Result<(), CliError> {
    let config = ConfigFile::load_from(path)?;

    println!("Configuration: {}", path.display());
    println!();
    println!("  style.url                      {}", config.style.url.as_deref().unwrap_or("(not set)"));
    println!("  cache.enabled                  {}", config.cache.enabled);
    println!("  cache.directory                {}", config.cache.directory.display());
    println!("  fetch.timeout                  {}s", config.fetch.timeout);
    println!("  pipeline.hybrid                {}", config.pipeline.hybrid);
    println!("  pipeline.background_to_raster  {}", config.pipeline.background_to_raster);
    println!("  render.base_draw_priority      {}", config.render.base_draw_priority);
    println!("  render.draw_priority_per_level {}", config.render.draw_priority_per_level);
    println!("  render.line_scale              {}", config.render.line_scale);
    println!("  render.text_scale              {}", config.render.text_scale);
    println!("  render.marker_scale            {}", config.render.marker_scale);
    println!("  logging.file                   {}", config.logging.file.display());
    Ok(())
}

fn run_init(path: PathBuf, force: bool) -> Result<(), CliError> {
    if path.exists() && !force {
        return Err(CliError::Config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    ConfigFile::default().save_to(&path)?;
    println!("Wrote {}", path.display());
    Ok(())
}
