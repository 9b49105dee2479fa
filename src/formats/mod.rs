// src/formats/mod.rs
// =============================================================================
// Known multi-file formats.
//
// Submodules:
// - registry: the extension lookup table
// - catalog: the families shipped with the crate
// =============================================================================

mod catalog;
mod registry;

pub use catalog::builtin_families;
pub use registry::{normalize_ext, Classification, FamilyId, FormatFamily, FormatRegistry, Role};
