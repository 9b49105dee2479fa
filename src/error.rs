// src/error.rs
// =============================================================================
// Typed errors for the library side of the crate.
//
// The CLI and the crawler use anyhow::Result like any application code, but
// callers embedding the bundling core need to match on what went wrong, so
// the core returns these enums instead.
// =============================================================================

use thiserror::Error;

/// Errors raised while turning a crawl document into bundles.
///
/// Flattening either fully succeeds or fails once for the whole input;
/// there are no partial results.
#[derive(Debug, Error)]
pub enum FlattenError {
    /// A node carried a `type` other than `file` or `index-of`.
    #[error("invalid node kind '{kind}' at {url}")]
    InvalidNodeKind { kind: String, url: String },

    /// The document was not valid JSON or did not have the node shape.
    #[error("malformed crawl document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while building a format registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("format family '{family}' declares an empty extension")]
    EmptyExtension { family: String },

    #[error("format family '{family}' lists its main extension '{ext}' as related")]
    MainListedAsRelated { family: String, ext: String },
}
