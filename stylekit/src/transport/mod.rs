//! Resource transport abstraction.
//!
//! Every resource a style references (the style document, TileJSON
//! documents, sprite sheets) is retrieved through a [`Transport`]. The
//! session never talks to the network or filesystem directly, which keeps
//! the fetch coordinator testable with scripted transports.
//!
//! # Implementations
//!
//! - [`HttpTransport`]: async reqwest client for `http(s)://` URLs
//! - [`FileTransport`]: reads `file://` URLs and bare filesystem paths
//! - [`StandardTransport`]: routes each URL to one of the above

mod file;
mod http;
mod types;

pub use file::{is_local_url, local_path, FileTransport};
pub use http::{HttpTransport, StandardTransport};
pub use types::{Transport, TransportError};

#[cfg(test)]
pub use types::tests::MockTransport;
