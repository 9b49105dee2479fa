// src/formats/catalog.rs
// =============================================================================
// Built-in format families.
//
// These cover the multi-file geospatial formats most often published as
// loose files in open-data index-of directories. Callers add their own
// families through the config file; see FormatRegistry::extend.
// =============================================================================

use tracing::warn;

use super::registry::{FormatFamily, FormatRegistry};

/// The built-in family list, in registration order.
pub fn builtin_families() -> Vec<FormatFamily> {
    vec![
        FormatFamily::new(
            "ESRI Shapefile",
            "shp",
            &[
                "shx", "dbf", "prj", "cpg", "qpj", "sbn", "sbx", "fbn", "fbx", "ain", "aih",
                "atx", "ixs", "mxs", "qix",
            ],
        ),
        FormatFamily::new("MapInfo TAB", "tab", &["dat", "map", "id", "ind"]),
        FormatFamily::new("MapInfo MIF", "mif", &["mid"]),
        FormatFamily::new("GeoTIFF", "tiff", &["ovr", "tfw", "tifw", "aux", "rrd", "prj"]),
        FormatFamily::new("JPEG 2000", "jp2", &["j2w", "aux"]),
        FormatFamily::new("ECW", "ecw", &["eww"]),
    ]
}

impl FormatRegistry {
    /// A registry holding only the built-in families.
    ///
    /// The list is constant and covered by the tests below; should it ever
    /// become invalid the registry comes back empty and the error is logged.
    pub fn builtin() -> Self {
        FormatRegistry::new(builtin_families()).unwrap_or_else(|e| {
            warn!(error = %e, "built-in format catalog is invalid, starting empty");
            FormatRegistry::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::Role;

    #[test]
    fn test_builtin_catalog_is_valid() {
        let families = builtin_families();
        let registry = FormatRegistry::new(families.clone()).unwrap();
        assert_eq!(registry.families().len(), families.len());
    }

    #[test]
    fn test_builtin_covers_vector_and_raster() {
        let registry = FormatRegistry::builtin();
        assert_eq!(registry.classify("shp").map(|c| c.role), Some(Role::Main));
        assert_eq!(registry.classify("shx").map(|c| c.role), Some(Role::Related));
        assert_eq!(registry.classify("tiff").map(|c| c.role), Some(Role::Main));
        assert_eq!(registry.classify("ovr").map(|c| c.role), Some(Role::Related));
        assert_eq!(registry.classify("doc"), None);
    }
}
