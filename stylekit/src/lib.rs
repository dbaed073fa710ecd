//! stylekit - style-driven map pipeline orchestration
//!
//! Given the URL of a Mapbox GL style, a [`session::StyleSession`] fetches
//! the style, the TileJSON of every remote source and the sprite sheet,
//! consulting an on-disk cache first. Once everything has arrived it builds
//! exactly one tile pipeline and attaches it to the host's map view:
//!
//! - a hybrid pipeline that rasterizes polygons offline and draws the rest
//!   of the style as vectors on top, or
//! - a legacy paging pipeline that draws the whole style as vectors.
//!
//! Tile loading, rendering and display are host collaborators behind the
//! traits in [`pipeline`] and [`view`]; [`pipeline::headless`] records
//! their calls without drawing anything.
//!
//! ```ignore
//! use stylekit::config::SessionConfig;
//! use stylekit::pipeline::HeadlessBackend;
//! use stylekit::session::StyleSession;
//! use stylekit::transport::StandardTransport;
//!
//! let config = SessionConfig::new().with_style_url("https://tiles.example.com/style.json");
//! let headless = Arc::new(HeadlessBackend::new(Presentation::Flat));
//! let mut session = StyleSession::new(config, Arc::new(StandardTransport::new()?), headless.backend());
//!
//! session.start().await?;
//! let outcome = session.wait_for_outcome().await;
//! ```

pub mod config;
pub mod fetch;
pub mod locator;
pub mod logging;
pub mod pipeline;
pub mod session;
pub mod style;
pub mod transport;
pub mod view;

/// Version of the stylekit library and CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
