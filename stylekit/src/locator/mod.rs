//! Resource location: URL overrides and the local resource cache.
//!
//! Every fetch a session issues goes through the [`ResourceLocator`] first.
//! The locator applies the caller's URL rewrite hook, then checks whether a
//! cached copy of the resource exists under the configured cache root.
//!
//! # Cache Layout
//!
//! The cache is a flat directory with one file per logical URL:
//!
//! ```text
//! <cache_root>/https%3A%2F%2Ftiles.example.com%2Fstyle.json
//! ```
//!
//! There is no index, no expiry and no integrity check. A file with the
//! expected name is treated as a valid cached copy.

mod path;
mod resolver;

pub use path::{cache_file_name, cache_path, MAX_FILE_NAME_LEN};
pub use resolver::{join_reference, FetchTarget, FileOverride, ResourceLocator};
