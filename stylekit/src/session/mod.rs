//! Session lifecycle.
//!
//! A [`StyleSession`] drives one style from URL to attached pipeline:
//!
//! 1. Fetch the style document (through the cache when possible).
//! 2. Parse it, then fetch every remote source's TileJSON and the sprite
//!    metadata and atlas, all concurrently.
//! 3. When the last fetch settles, build the pipeline exactly once.
//!
//! Any failure aborts the run: outstanding fetches are cancelled, nothing
//! is attached, and the state becomes [`SessionState::Aborted`].

mod coordinator;
mod error;
mod session;
mod state;

pub use error::SessionError;
pub use session::StyleSession;
pub use state::{SessionOutcome, SessionState};
