// src/lib.rs
// =============================================================================
// link-bundler: crawl remote locations and group the files found there into
// downloadable bundles.
//
// The heart of the crate is `flatten`, a pure function from a crawl tree to
// an ordered list of bundles, driven by the format `registry`. The crawler,
// config and reporting modules are the plumbing around it used by the CLI.
// =============================================================================

pub mod cli;
pub mod config;
pub mod crawl;
pub mod error;
pub mod flatten;
pub mod formats;
pub mod logging;
pub mod report;
pub mod tree;

pub use error::{FlattenError, RegistryError};
pub use flatten::{flatten, flatten_document, Bundle, Flattener, OwnedBundle};
pub use formats::{FormatFamily, FormatRegistry, Role};
pub use tree::{parse_tree, FileNode, FileType, Listing, Node};
