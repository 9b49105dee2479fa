// src/tree.rs
// =============================================================================
// The crawl tree: what the crawler produces and what the flattener consumes.
//
// A node is either a file or an "index-of" listing holding more nodes. The
// JSON shape matches the crawl results stored by the link service:
//
//   { "type": "index-of", "url": "...", "children": [
//       { "type": "file", "url": "...", "fileName": "foo.shp",
//         "fileTypes": [{ "ext": "shp" }] }
//   ] }
//
// Parsing goes through a loose RawNode first so an unknown "type" becomes a
// typed InvalidNodeKind error instead of a generic serde message.
// =============================================================================

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::FlattenError;

/// One candidate classification for a file, as produced by sniffing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileType {
    pub ext: String,
}

impl FileType {
    pub fn new(ext: impl Into<String>) -> Self {
        FileType { ext: ext.into() }
    }
}

/// A node of the crawl tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Node {
    #[serde(rename = "file")]
    File(FileNode),
    #[serde(rename = "index-of")]
    Listing(Listing),
}

/// A leaf of the crawl tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileNode {
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default)]
    pub file_types: Vec<FileType>,
}

/// A directory-style listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    pub url: String,
    pub children: Vec<Node>,
}

impl Node {
    pub fn url(&self) -> &str {
        match self {
            Node::File(file) => &file.url,
            Node::Listing(listing) => &listing.url,
        }
    }
}

impl FileNode {
    pub fn new(url: impl Into<String>, file_name: Option<String>, file_types: Vec<FileType>) -> Self {
        FileNode {
            url: url.into(),
            file_name,
            file_types,
        }
    }

    /// The file's name: `fileName` when set, otherwise the last segment of
    /// the URL.
    pub fn name(&self) -> String {
        match &self.file_name {
            Some(name) => name.clone(),
            None => last_segment(&self.url),
        }
    }

    /// The grouping key for companion files: the name without its final
    /// extension.
    pub fn base_name(&self) -> String {
        strip_extension(&self.name()).to_string()
    }
}

// Last non-empty path segment of a URL, falling back to the host for
// URLs like "http://foo" whose path is just "/".
pub(crate) fn last_segment(url: &str) -> String {
    if let Ok(parsed) = Url::parse(url) {
        let segment = parsed
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .map(str::to_string);

        if let Some(segment) = segment {
            return segment;
        }
        if let Some(host) = parsed.host_str() {
            return host.to_string();
        }
    }

    // Not an absolute URL: treat it as a plain path.
    let path = url.split(|c| c == '?' || c == '#').next().unwrap_or(url);
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(path)
        .to_string()
}

/// Removes the final `.ext` suffix. Names without a dot, and dot-files such
/// as `.htaccess`, are returned whole.
pub fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(index) if index > 0 => &name[..index],
        _ => name,
    }
}

// Loose shape accepted from JSON before the kind is checked.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNode {
    #[serde(rename = "type", alias = "kind")]
    kind: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    file_name: Option<String>,
    #[serde(default)]
    file_types: Vec<FileType>,
    #[serde(default)]
    children: Vec<RawNode>,
}

impl TryFrom<RawNode> for Node {
    type Error = FlattenError;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        match raw.kind.as_str() {
            "file" => Ok(Node::File(FileNode {
                url: raw.url,
                file_name: raw.file_name,
                file_types: raw.file_types,
            })),
            "index-of" | "listing" => {
                let children = raw
                    .children
                    .into_iter()
                    .map(Node::try_from)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Node::Listing(Listing {
                    url: raw.url,
                    children,
                }))
            }
            _ => Err(FlattenError::InvalidNodeKind {
                kind: raw.kind,
                url: raw.url,
            }),
        }
    }
}

/// Parses a crawl document.
///
/// A JSON `null` document is an empty input and yields `Ok(None)`. A node
/// of unknown kind anywhere in the tree rejects the whole document.
pub fn parse_tree(json: &str) -> Result<Option<Node>, FlattenError> {
    let raw: Option<RawNode> = serde_json::from_str(json)?;
    raw.map(Node::try_from).transpose()
}
