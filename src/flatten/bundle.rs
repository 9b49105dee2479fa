// src/flatten/bundle.rs
// =============================================================================
// Second half of flattening: turn each base-name bucket into bundles.
//
// For every family with a main candidate in the bucket:
// - the primary is the first file whose types say "main of F" and NOT also
//   "companion of F"; a file matching both roles is only promoted when no
//   clean candidate exists
// - every other unclaimed file typed as a companion of F joins the bundle
//
// Whatever is left over (unknown types, companions without a main, extra
// clean mains) becomes a bundle of its own.
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::group::{Bucket, Leaf};
use crate::formats::{Classification, FamilyId, FormatRegistry, Role};
use crate::tree::FileNode;

/// One logical downloadable artifact.
///
/// Borrows its files from the crawl tree it was built from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bundle<'a> {
    /// Name of the matched format family; absent for standalone files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    pub primary: &'a FileNode,
    pub related: Vec<&'a FileNode>,
}

impl<'a> Bundle<'a> {
    /// A bundle made of a single file.
    pub fn standalone(file: &'a FileNode) -> Self {
        Bundle {
            family: None,
            primary: file,
            related: Vec::new(),
        }
    }

    /// The primary followed by its related files.
    pub fn files(&self) -> impl Iterator<Item = &'a FileNode> + '_ {
        std::iter::once(self.primary).chain(self.related.iter().copied())
    }

    pub fn to_owned_bundle(&self) -> OwnedBundle {
        OwnedBundle {
            family: self.family.clone(),
            primary: self.primary.clone(),
            related: self.related.iter().map(|file| (*file).clone()).collect(),
        }
    }
}

/// A bundle that owns its files, for callers that drop the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnedBundle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    pub primary: FileNode,
    pub related: Vec<FileNode>,
}

// A leaf plus what the registry says about each of its types.
struct Classified<'a> {
    leaf: Leaf<'a>,
    classes: Vec<Classification>,
}

impl Classified<'_> {
    fn has(&self, family: FamilyId, role: Role) -> bool {
        self.classes.contains(&Classification { family, role })
    }

    // Main of F by its types, with no companion-of-F reading.
    fn is_clean_main(&self, family: FamilyId) -> bool {
        self.has(family, Role::Main) && !self.has(family, Role::Related)
    }
}

/// Bundles for one bucket, each paired with the walk position of its
/// primary so the caller can restore document order.
pub(crate) fn bundle_bucket<'a>(
    bucket: &Bucket<'a>,
    registry: &FormatRegistry,
) -> Vec<(usize, Bundle<'a>)> {
    let classified: Vec<Classified> = bucket
        .leaves
        .iter()
        .map(|leaf| classify_leaf(*leaf, registry))
        .collect();

    let count = classified.len();
    let families = families_with_main(&classified);
    let mut claimed = vec![false; count];
    let mut primaries: Vec<Option<usize>> = vec![None; families.len()];

    // Primaries are chosen for every family before any companion is handed
    // out, so a clean main of one family is never swallowed as a companion
    // of another. Clean candidates go first; a file that is both main and
    // companion of a family only fills the families still left without one.
    for (slot, &family) in primaries.iter_mut().zip(&families) {
        *slot = (0..count).find(|&i| !claimed[i] && classified[i].is_clean_main(family));
        if let Some(i) = *slot {
            claimed[i] = true;
        }
    }
    for (slot, &family) in primaries.iter_mut().zip(&families) {
        if slot.is_none() {
            *slot = (0..count).find(|&i| !claimed[i] && classified[i].has(family, Role::Main));
            if let Some(i) = *slot {
                claimed[i] = true;
            }
        }
    }

    let mut bundles = Vec::new();

    for (primary, &family) in primaries.iter().zip(&families) {
        // Every candidate is primary of another family.
        let Some(primary) = *primary else {
            continue;
        };

        let related: Vec<usize> = (0..count)
            .filter(|&i| !claimed[i])
            .filter(|&i| classified[i].has(family, Role::Related))
            .collect();

        for &i in &related {
            claimed[i] = true;
        }

        let name = &registry.family(family).name;
        debug!(
            base_name = %bucket.base_name,
            family = %name,
            primary = %classified[primary].leaf.file.url,
            related = related.len(),
            "grouped bundle"
        );

        bundles.push((
            classified[primary].leaf.position,
            Bundle {
                family: Some(name.clone()),
                primary: classified[primary].leaf.file,
                related: related.iter().map(|&i| classified[i].leaf.file).collect(),
            },
        ));
    }

    for (i, entry) in classified.iter().enumerate() {
        if !claimed[i] {
            trace!(url = %entry.leaf.file.url, "standalone file");
            bundles.push((entry.leaf.position, Bundle::standalone(entry.leaf.file)));
        }
    }

    bundles
}

fn classify_leaf<'a>(leaf: Leaf<'a>, registry: &FormatRegistry) -> Classified<'a> {
    let mut classes = Vec::new();
    for file_type in &leaf.file.file_types {
        for class in registry.classifications(&file_type.ext) {
            if !classes.contains(class) {
                classes.push(*class);
            }
        }
    }

    trace!(url = %leaf.file.url, classes = classes.len(), "classified file");
    Classified { leaf, classes }
}

// Families that have at least one main candidate, in the order their first
// candidate appears in the bucket.
fn families_with_main(classified: &[Classified]) -> Vec<FamilyId> {
    let mut families = Vec::new();
    for entry in classified {
        for class in &entry.classes {
            if class.role == Role::Main && !families.contains(&class.family) {
                families.push(class.family);
            }
        }
    }
    families
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::group::{collect_leaves, group_by_base_name};
    use crate::formats::FormatFamily;
    use crate::tree::{FileType, Listing, Node};

    fn registry() -> FormatRegistry {
        FormatRegistry::new(vec![
            FormatFamily::new("ESRI Shapefile", "shp", &["shx", "dbf", "prj"]),
            FormatFamily::new("GeoTIFF", "tiff", &["ovr", "tfw", "prj"]),
        ])
        .unwrap()
    }

    fn file(name: &str, exts: &[&str]) -> Node {
        Node::File(FileNode::new(
            format!("http://foo/{}", name),
            Some(name.to_string()),
            exts.iter().map(|ext| FileType::new(*ext)).collect(),
        ))
    }

    // Runs a single-bucket listing through the bucket step.
    fn bundle_names(children: Vec<Node>) -> Vec<(String, Vec<String>)> {
        let tree = Node::Listing(Listing {
            url: "http://foo/".to_string(),
            children,
        });
        let registry = registry();
        let buckets = group_by_base_name(collect_leaves(&tree));
        assert_eq!(buckets.len(), 1);

        let mut bundles = bundle_bucket(&buckets[0], &registry);
        bundles.sort_by_key(|(position, _)| *position);
        bundles
            .into_iter()
            .map(|(_, b)| {
                (
                    b.primary.name(),
                    b.related.iter().map(|f| f.name()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_ambiguous_file_never_beats_clean_main() {
        let bundles = bundle_names(vec![
            file("file.ovr", &["ovr", "tiff"]),
            file("file.tiff", &["tiff"]),
        ]);
        assert_eq!(
            bundles,
            vec![("file.tiff".to_string(), vec!["file.ovr".to_string()])]
        );
    }

    #[test]
    fn test_ambiguous_file_promoted_when_alone() {
        let bundles = bundle_names(vec![
            file("file.ovr", &["ovr", "tiff"]),
            file("file.tfw", &["tfw"]),
        ]);
        assert_eq!(
            bundles,
            vec![("file.ovr".to_string(), vec!["file.tfw".to_string()])]
        );
    }

    #[test]
    fn test_related_without_main_stand_alone() {
        let bundles = bundle_names(vec![file("a.shx", &["shx"]), file("a.dbf", &["dbf"])]);
        assert_eq!(
            bundles,
            vec![
                ("a.shx".to_string(), vec![]),
                ("a.dbf".to_string(), vec![]),
            ]
        );
    }

    #[test]
    fn test_second_clean_main_stands_alone() {
        let bundles = bundle_names(vec![
            file("a.shp", &["shp"]),
            file("a.SHP", &["shp"]),
            file("a.shx", &["shx"]),
        ]);
        assert_eq!(
            bundles,
            vec![
                ("a.shp".to_string(), vec!["a.shx".to_string()]),
                ("a.SHP".to_string(), vec![]),
            ]
        );
    }

    #[test]
    fn test_two_families_in_one_bucket() {
        let bundles = bundle_names(vec![
            file("a.shp", &["shp"]),
            file("a.tiff", &["tiff"]),
            file("a.dbf", &["dbf"]),
            file("a.ovr", &["ovr"]),
            file("a.prj", &["prj"]),
        ]);
        // The shared companion goes to the family whose main comes first.
        assert_eq!(
            bundles,
            vec![
                (
                    "a.shp".to_string(),
                    vec!["a.dbf".to_string(), "a.prj".to_string()]
                ),
                ("a.tiff".to_string(), vec!["a.ovr".to_string()]),
            ]
        );
    }

    #[test]
    fn test_clean_main_is_not_taken_as_another_familys_companion() {
        let registry = FormatRegistry::new(vec![
            FormatFamily::new("World file raster", "x", &["tiff"]),
            FormatFamily::new("GeoTIFF", "tiff", &["ovr"]),
        ])
        .unwrap();
        let tree = Node::Listing(Listing {
            url: "http://foo/".to_string(),
            children: vec![
                file("a.x", &["x"]),
                file("a.tiff", &["tiff"]),
                file("a.ovr", &["ovr"]),
            ],
        });
        let buckets = group_by_base_name(collect_leaves(&tree));

        let mut bundles = bundle_bucket(&buckets[0], &registry);
        bundles.sort_by_key(|(position, _)| *position);
        let summary: Vec<_> = bundles
            .iter()
            .map(|(_, b)| {
                (
                    b.family.clone(),
                    b.primary.name(),
                    b.related.iter().map(|f| f.name()).collect::<Vec<_>>(),
                )
            })
            .collect();

        assert_eq!(
            summary,
            vec![
                (Some("World file raster".to_string()), "a.x".to_string(), vec![]),
                (
                    Some("GeoTIFF".to_string()),
                    "a.tiff".to_string(),
                    vec!["a.ovr".to_string()]
                ),
            ]
        );
    }

    #[test]
    fn test_unknown_and_untyped_files_stand_alone() {
        let bundles = bundle_names(vec![
            file("a.shp", &["shp"]),
            file("a.txt", &["txt"]),
            file("a.bin", &[]),
        ]);
        assert_eq!(
            bundles,
            vec![
                ("a.shp".to_string(), vec![]),
                ("a.txt".to_string(), vec![]),
                ("a.bin".to_string(), vec![]),
            ]
        );
    }

    #[test]
    fn test_duplicate_types_do_not_double_count() {
        let bundles = bundle_names(vec![
            file("a.shp", &["shp", "SHP"]),
            file("a.shx", &["shx", "shx"]),
        ]);
        assert_eq!(
            bundles,
            vec![("a.shp".to_string(), vec!["a.shx".to_string()])]
        );
    }

    #[test]
    fn test_files_iterates_primary_first() {
        let primary = FileNode::new("http://foo/a.shp", None, vec![]);
        let related = FileNode::new("http://foo/a.shx", None, vec![]);
        let bundle = Bundle {
            family: None,
            primary: &primary,
            related: vec![&related],
        };
        let urls: Vec<_> = bundle.files().map(|f| f.url.as_str()).collect();
        assert_eq!(urls, vec!["http://foo/a.shp", "http://foo/a.shx"]);
    }
}
