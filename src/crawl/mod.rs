// src/crawl/mod.rs
// =============================================================================
// This module crawls remote locations into a crawl tree.
//
// Submodules:
// - listing: reads "Index of" directory pages
// - sniff: guesses file types from names and headers
// - walker: fetches pages and builds the tree
// =============================================================================

mod listing;
mod sniff;
mod walker;

pub use listing::{extract_index_entries, listing_base, looks_like_index, IndexEntry};
pub use sniff::{file_name_from_disposition, sniff_file_types};
pub use walker::crawl;
