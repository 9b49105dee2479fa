// src/formats/registry.rs
// =============================================================================
// The format registry: a lookup table from file extension to the format
// families it belongs to, and whether it is that family's main extension or
// one of its companions.
//
// The table is plain data. The flattener only ever asks "what is this
// extension?", so adding a family never touches traversal code.
//
// Lookups are case-insensitive and ignore a leading dot, so "SHP", ".shp"
// and "shp" all land on the same entry.
// =============================================================================

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RegistryError;

/// A group of extensions that together make one logical artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatFamily {
    /// Display label, e.g. "ESRI Shapefile"
    pub name: String,
    /// The extension of the authoritative file
    pub main: String,
    /// Companion extensions
    #[serde(default)]
    pub related: Vec<String>,
}

impl FormatFamily {
    pub fn new(name: &str, main: &str, related: &[&str]) -> Self {
        FormatFamily {
            name: name.to_string(),
            main: main.to_string(),
            related: related.iter().map(|ext| ext.to_string()).collect(),
        }
    }
}

/// Position of a family inside its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FamilyId(usize);

/// Whether an extension is a family's main file or a companion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Main,
    Related,
}

/// One answer from the registry for an extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Classification {
    pub family: FamilyId,
    pub role: Role,
}

/// Read-only extension lookup built from a list of families.
#[derive(Debug, Clone, Default)]
pub struct FormatRegistry {
    families: Vec<FormatFamily>,
    index: HashMap<String, Vec<Classification>>,
}

impl FormatRegistry {
    /// Builds a registry, validating every family.
    pub fn new(families: Vec<FormatFamily>) -> Result<Self, RegistryError> {
        let mut registry = FormatRegistry::default();
        registry.extend(families)?;
        Ok(registry)
    }

    /// Adds families after the existing ones.
    ///
    /// Nothing is added if any of the new families is invalid.
    pub fn extend(&mut self, families: Vec<FormatFamily>) -> Result<(), RegistryError> {
        for family in &families {
            validate(family)?;
        }

        for family in families {
            let id = FamilyId(self.families.len());
            debug!(family = %family.name, main = %family.main, "registering format family");

            self.insert(&family.main, id, Role::Main);
            for ext in &family.related {
                self.insert(ext, id, Role::Related);
            }
            self.families.push(family);
        }

        Ok(())
    }

    fn insert(&mut self, ext: &str, family: FamilyId, role: Role) {
        let entry = self.index.entry(normalize_ext(ext)).or_default();
        let classification = Classification { family, role };
        if !entry.contains(&classification) {
            entry.push(classification);
        }
    }

    /// The first registered classification for `ext`, or `None` when the
    /// extension is unknown.
    pub fn classify(&self, ext: &str) -> Option<Classification> {
        self.classifications(ext).first().copied()
    }

    /// Every classification for `ext`. An extension may be the main of one
    /// family and a companion of others.
    pub fn classifications(&self, ext: &str) -> &[Classification] {
        self.index
            .get(&normalize_ext(ext))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn family(&self, id: FamilyId) -> &FormatFamily {
        &self.families[id.0]
    }

    pub fn families(&self) -> &[FormatFamily] {
        &self.families
    }
}

fn validate(family: &FormatFamily) -> Result<(), RegistryError> {
    let main = normalize_ext(&family.main);
    if main.is_empty() {
        return Err(RegistryError::EmptyExtension {
            family: family.name.clone(),
        });
    }

    for ext in &family.related {
        let ext = normalize_ext(ext);
        if ext.is_empty() {
            return Err(RegistryError::EmptyExtension {
                family: family.name.clone(),
            });
        }
        if ext == main {
            return Err(RegistryError::MainListedAsRelated {
                family: family.name.clone(),
                ext,
            });
        }
    }

    Ok(())
}

/// Lower-cases an extension and drops surrounding whitespace and a leading
/// dot. Common spelling variants fold onto one form ("tif" is "tiff").
pub fn normalize_ext(ext: &str) -> String {
    let ext = ext.trim().trim_start_matches('.').to_lowercase();
    match ext.as_str() {
        "tif" => "tiff".to_string(),
        "jpeg" => "jpg".to_string(),
        _ => ext,
    }
}
