// src/flatten/mod.rs
// =============================================================================
// Turns a crawl tree into a flat, ordered list of bundles.
//
// Submodules:
// - group: depth-first collection and base-name bucketing
// - bundle: per-bucket classification and the ambiguous-main tie-break
//
// The whole thing is a pure function over an in-memory tree. It never
// mutates its input, so independent trees can be flattened from any number
// of threads at once.
// =============================================================================

mod bundle;
mod group;

use tracing::debug;

use crate::error::FlattenError;
use crate::formats::FormatRegistry;
use crate::tree::{parse_tree, Node};

pub use bundle::{Bundle, OwnedBundle};

/// Flattens crawl trees against one format registry.
#[derive(Debug, Clone, Copy)]
pub struct Flattener<'r> {
    registry: &'r FormatRegistry,
}

impl<'r> Flattener<'r> {
    pub fn new(registry: &'r FormatRegistry) -> Self {
        Flattener { registry }
    }

    /// Bundles every file of `root`.
    ///
    /// Every file ends up in exactly one bundle, and bundles come out in
    /// the order their primary file is met walking the tree depth-first.
    pub fn flatten<'a>(&self, root: &'a Node) -> Vec<Bundle<'a>> {
        let leaves = group::collect_leaves(root);
        let leaf_count = leaves.len();
        let buckets = group::group_by_base_name(leaves);

        let mut bundles: Vec<(usize, Bundle<'a>)> = buckets
            .iter()
            .flat_map(|bucket| bundle::bundle_bucket(bucket, self.registry))
            .collect();

        // Positions are unique, one per primary.
        bundles.sort_by_key(|(position, _)| *position);

        debug!(
            url = %root.url(),
            files = leaf_count,
            buckets = buckets.len(),
            bundles = bundles.len(),
            "flattened crawl tree"
        );

        bundles.into_iter().map(|(_, bundle)| bundle).collect()
    }
}

/// Flattens a tree with the given registry.
pub fn flatten<'a>(root: &'a Node, registry: &FormatRegistry) -> Vec<Bundle<'a>> {
    Flattener::new(registry).flatten(root)
}

/// Parses a crawl document and flattens it.
///
/// A `null` document produces no bundles. Any invalid node rejects the
/// whole document.
pub fn flatten_document(json: &str, registry: &FormatRegistry) -> Result<Vec<OwnedBundle>, FlattenError> {
    let Some(root) = parse_tree(json)? else {
        debug!("empty crawl document");
        return Ok(Vec::new());
    };

    Ok(flatten(&root, registry)
        .iter()
        .map(Bundle::to_owned_bundle)
        .collect())
}
