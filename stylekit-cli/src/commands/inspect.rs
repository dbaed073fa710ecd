//! `inspect`: resolve a style and report the pipeline it produces.
//!
//! Runs a real session (network, cache and all) against the headless
//! backend, so nothing is drawn. Useful to check a style's sources and
//! zoom range, warm the cache, or see which layers land in the raster
//! background.

use crate::error::CliError;
use crate::runner::CliRunner;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use stylekit::pipeline::{HeadlessBackend, HeadlessEvent, PipelineSummary, TileKey};
use stylekit::session::{SessionOutcome, StyleSession};
use stylekit::transport::{HttpTransport, StandardTransport};
use stylekit::view::Presentation;
use tracing::info;

/// Arguments for the inspect command.
#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Style URL or path (overrides [style] url)
    #[arg(long)]
    pub style: Option<String>,

    /// Cache directory (overrides [cache] directory)
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Do not read or write the cache
    #[arg(long, conflicts_with = "cache_dir")]
    pub no_cache: bool,

    /// Build the legacy paging pipeline instead of the hybrid one
    #[arg(long)]
    pub no_hybrid: bool,

    /// Draw background and fill layers as vectors in hybrid mode
    #[arg(long)]
    pub no_raster_background: bool,

    /// Inspect for a globe view instead of a flat map
    #[arg(long)]
    pub globe: bool,

    /// HTTP timeout in seconds (overrides [fetch] timeout)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Print the layer plan for a tile, as z/x/y (repeatable)
    #[arg(long = "tile", value_parser = parse_tile_key)]
    pub tiles: Vec<TileKey>,
}

/// Run the inspect command.
pub fn run(args: InspectArgs, runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("inspect");

    let file_config = runner.config();
    let mut config = file_config.session_config();
    if let Some(style) = &args.style {
        config = config.with_style_url(style.clone());
    }
    if let Some(dir) = &args.cache_dir {
        config = config.with_cache_root(dir.clone());
    }
    if args.no_hybrid {
        config = config.with_hybrid_mode(false);
    }
    if args.no_raster_background {
        config = config.with_background_polygons_to_raster(false);
    }
    if args.no_cache {
        config = config.without_cache();
    }

    let timeout = args.timeout.unwrap_or(file_config.fetch.timeout);
    let transport = StandardTransport::with_http(HttpTransport::with_timeout(timeout)?);

    let presentation = if args.globe {
        Presentation::Globe
    } else {
        Presentation::Flat
    };
    let headless = Arc::new(HeadlessBackend::new(presentation));

    let runtime = tokio::runtime::Runtime::new().map_err(CliError::Runtime)?;
    runtime.block_on(async {
        let mut session = StyleSession::new(config, Arc::new(transport), headless.backend());
        session.start().await?;

        let outcome = session.wait_for_outcome().await;
        let result = match outcome {
            SessionOutcome::Attached(summary) => {
                info!(kind = %summary.kind, "Inspection complete");
                print_summary(&summary, &headless);
                print_tiles(&summary, &headless, &args.tiles);
                Ok(())
            }
            SessionOutcome::Failed(err) => Err(CliError::Session(err)),
            SessionOutcome::Stopped => Ok(()),
        };

        session.stop().await;
        result
    })
}

fn print_summary(summary: &PipelineSummary, headless: &HeadlessBackend) {
    println!("Pipeline:    {}", summary.kind);
    println!("Layer:       {}", summary.layer);
    println!("Zoom range:  {}", summary.zoom);
    println!("Sources:     {}", summary.sources.join(", "));

    match summary.background {
        Some(target) => println!(
            "Background:  offline render #{} ({}x{})",
            target.id, target.size.width, target.size.height
        ),
        None => println!("Background:  none"),
    }
    if let Some(color) = summary.clear_color {
        println!("Clear color: {}", color);
    }

    for event in headless.events() {
        match event {
            HeadlessEvent::RasterStarted { params, .. } => println!(
                "Sampling:    min importance {}, single level {}, cover poles {}, edge matching {}",
                params.min_importance, params.single_level, params.cover_poles, params.edge_matching
            ),
            HeadlessEvent::PagingCreated { config, .. } => println!(
                "Paging:      importance {}, single level {}",
                config.importance, config.single_level_loading
            ),
            _ => {}
        }
    }
}

fn print_tiles(summary: &PipelineSummary, headless: &HeadlessBackend, tiles: &[TileKey]) {
    let Some(interpreter) = headless.interpreter(summary.layer) else {
        return;
    };

    for tile in tiles {
        let plan = interpreter.interpret(*tile);
        println!();
        println!("Tile {}:", tile);
        if let Some(priority) = plan.image_priority {
            let ids: Vec<_> = plan.raster_layers.iter().map(|l| l.id.as_str()).collect();
            println!("  raster (priority {}): {}", priority, ids.join(", "));
        }
        let ids: Vec<_> = plan.vector_layers.iter().map(|l| l.id.as_str()).collect();
        println!("  vector: {}", if ids.is_empty() { "(none)".to_string() } else { ids.join(", ") });
    }
}

/// Parse `z/x/y`.
fn parse_tile_key(value: &str) -> Result<TileKey, String> {
    let parts: Vec<&str> = value.split('/').collect();
    let [z, x, y] = parts.as_slice() else {
        return Err(format!("expected z/x/y, got '{}'", value));
    };
    let zoom: u8 = z.parse().map_err(|_| format!("invalid zoom '{}'", z))?;
    let x: u32 = x.parse().map_err(|_| format!("invalid x '{}'", x))?;
    let y: u32 = y.parse().map_err(|_| format!("invalid y '{}'", y))?;

    let extent = 1u64 << zoom.min(32);
    if u64::from(x) >= extent || u64::from(y) >= extent {
        return Err(format!("tile {} is outside zoom {}", value, zoom));
    }
    Ok(TileKey::new(zoom, x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tile_key() {
        assert_eq!(parse_tile_key("6/10/20").unwrap(), TileKey::new(6, 10, 20));
        assert!(parse_tile_key("6/10").is_err());
        assert!(parse_tile_key("a/1/1").is_err());
        assert!(parse_tile_key("2/4/0").is_err());
    }
}
