//! Fetch bookkeeping for a session.
//!
//! A session run issues one style fetch, then one fetch per unresolved
//! source TileJSON and, if the style declares a sprite, two sprite fetches.
//! [`FetchSet`] tracks them, and its [`FetchJoin`] fires exactly once when
//! the last one settles.

mod handle;
mod join;
mod set;

pub use handle::{FetchHandle, FetchId, FetchPurpose, FetchStatus};
pub use join::FetchJoin;
pub use set::{FetchCompletion, FetchSet};
