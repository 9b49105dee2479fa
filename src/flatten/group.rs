// src/flatten/group.rs
// =============================================================================
// First half of flattening: walk the tree and group its files.
//
// 1. Collect every file in document order, descending into listings as they
//    are met (depth-first).
// 2. Bucket the files by base name. Buckets keep the order of their first
//    file and files keep their order inside a bucket.
// =============================================================================

use std::collections::HashMap;

use crate::tree::{FileNode, Node};

/// A file together with its position in the depth-first walk.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Leaf<'a> {
    pub position: usize,
    pub file: &'a FileNode,
}

/// Files sharing one base name.
#[derive(Debug)]
pub(crate) struct Bucket<'a> {
    pub base_name: String,
    pub leaves: Vec<Leaf<'a>>,
}

/// Every file of the tree, depth-first, children in their given order.
///
/// Uses an explicit stack so very deep listings cannot overflow the call
/// stack.
pub(crate) fn collect_leaves(root: &Node) -> Vec<Leaf<'_>> {
    let mut leaves = Vec::new();
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        match node {
            Node::File(file) => leaves.push(Leaf {
                position: leaves.len(),
                file,
            }),
            // Reversed so the first child is popped first.
            Node::Listing(listing) => stack.extend(listing.children.iter().rev()),
        }
    }

    leaves
}

/// Stable grouping by exact base name.
pub(crate) fn group_by_base_name(leaves: Vec<Leaf<'_>>) -> Vec<Bucket<'_>> {
    let mut buckets: Vec<Bucket> = Vec::new();
    let mut by_name: HashMap<String, usize> = HashMap::new();

    for leaf in leaves {
        let base_name = leaf.file.base_name();
        match by_name.get(&base_name) {
            Some(&index) => buckets[index].leaves.push(leaf),
            None => {
                by_name.insert(base_name.clone(), buckets.len());
                buckets.push(Bucket {
                    base_name,
                    leaves: vec![leaf],
                });
            }
        }
    }

    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{FileType, Listing};

    fn file(name: &str) -> Node {
        Node::File(FileNode::new(
            format!("http://foo/{}", name),
            Some(name.to_string()),
            vec![FileType::new("bin")],
        ))
    }

    fn listing(children: Vec<Node>) -> Node {
        Node::Listing(Listing {
            url: "http://foo/".to_string(),
            children,
        })
    }

    fn names(leaves: &[Leaf]) -> Vec<String> {
        leaves.iter().map(|leaf| leaf.file.name()).collect()
    }

    #[test]
    fn test_collect_is_depth_first_in_document_order() {
        let tree = listing(vec![
            file("a.txt"),
            listing(vec![file("b.txt"), listing(vec![file("c.txt")])]),
            file("d.txt"),
        ]);

        let leaves = collect_leaves(&tree);
        assert_eq!(names(&leaves), vec!["a.txt", "b.txt", "c.txt", "d.txt"]);
        let positions: Vec<_> = leaves.iter().map(|leaf| leaf.position).collect();
        assert_eq!(positions, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_lone_file_is_one_leaf() {
        assert_eq!(collect_leaves(&file("a.doc")).len(), 1);
    }

    #[test]
    fn test_empty_listings_contribute_nothing() {
        let tree = listing(vec![listing(vec![]), listing(vec![listing(vec![])])]);
        assert!(collect_leaves(&tree).is_empty());
    }

    #[test]
    fn test_grouping_is_stable() {
        let tree = listing(vec![
            file("b.shp"),
            file("a.shp"),
            file("b.dbf"),
            file("a.dbf"),
        ]);

        let buckets = group_by_base_name(collect_leaves(&tree));
        let keys: Vec<_> = buckets.iter().map(|b| b.base_name.as_str()).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(names(&buckets[0].leaves), vec!["b.shp", "b.dbf"]);
        assert_eq!(names(&buckets[1].leaves), vec!["a.shp", "a.dbf"]);
    }

    #[test]
    fn test_base_names_match_exactly() {
        let tree = listing(vec![file("Roads.shp"), file("roads.shx")]);
        assert_eq!(group_by_base_name(collect_leaves(&tree)).len(), 2);
    }
}
