//! CLI command implementations.
//!
//! - [`inspect`] - Run a session against the headless backend and report
//!   the pipeline a style produces
//! - [`config`] - Configuration file helpers (path, show, init)

pub mod config;
pub mod inspect;
