//! The immutable target catalog.
//!
//! Built once from the list of known target paths. Targets are ordered
//! alphabetically by path; that ordering is the authoritative slot order for
//! every dense per-target array in the engine (value slots and displacement
//! data alike).

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::ModelError;
use crate::target::{parse_path, TargetMeta};

/// A target path together with the dependency names that scale its weight.
///
/// Dependencies are the target's category tags plus its own group string,
/// which acts as a pseudo-dependency resolved by the owning modifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetBinding {
    /// Dense slot of the target in catalog order.
    pub slot: usize,
    /// Canonical target path.
    pub path: String,
    /// Dependency names: sorted category tags, then the group string.
    pub dependencies: Vec<String>,
}

/// On-disk shape of a target list: `{"targets": {"<path>": ...}}`.
#[derive(Debug, Deserialize)]
struct TargetListFile {
    targets: HashMap<String, serde_json::Value>,
}

/// Immutable index of all known morph targets.
#[derive(Debug, Clone)]
pub struct TargetCatalog {
    targets: Vec<TargetMeta>,
    index: HashMap<String, usize>,
    groups: HashMap<String, Vec<usize>>,
}

impl TargetCatalog {
    /// Builds a catalog from target paths. Paths are parsed, deduplicated by
    /// canonical (lower-cased) identity, and sorted alphabetically.
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut targets: Vec<TargetMeta> = Vec::new();
        let mut seen: HashMap<String, ()> = HashMap::new();
        for path in paths {
            let meta = parse_path(path.as_ref());
            if seen.insert(meta.path.clone(), ()).is_none() {
                targets.push(meta);
            }
        }
        targets.sort_by(|a, b| a.path.cmp(&b.path));

        let mut index = HashMap::with_capacity(targets.len());
        let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
        for (slot, meta) in targets.iter().enumerate() {
            index.insert(meta.path.clone(), slot);
            groups.entry(meta.group.clone()).or_default().push(slot);
        }

        Self {
            targets,
            index,
            groups,
        }
    }

    /// Parses a catalog from target-list JSON (`{"targets": {"<path>": ...}}`).
    pub fn from_target_list_json(json: &str) -> Result<Self, ModelError> {
        let file: TargetListFile = serde_json::from_str(json)?;
        Ok(Self::from_paths(file.targets.keys()))
    }

    /// Number of targets in the catalog.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Returns true if the catalog holds no targets.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Returns the dense slot of a target by canonical path.
    pub fn slot(&self, path: &str) -> Option<usize> {
        self.index.get(path).copied()
    }

    /// Returns the target metadata at a slot.
    pub fn target(&self, slot: usize) -> &TargetMeta {
        &self.targets[slot]
    }

    /// All targets in slot order.
    pub fn targets(&self) -> &[TargetMeta] {
        &self.targets
    }

    /// Iterates over all known group strings.
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Returns the slots of all targets sharing a group. The key is
    /// normalized through path parsing first, so a full target path, a raw
    /// group string, or a `{group}-{name}` modifier key all resolve.
    /// Unknown groups yield an empty slice.
    pub fn targets_by_group(&self, key: &str) -> &[usize] {
        let group = parse_path(key).group;
        self.groups.get(&group).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Resolves a group key to bindings `(slot, path, dependency names)`.
    ///
    /// Dependencies are the target's sorted category tags plus its own group
    /// string. `None` and unknown keys resolve to an empty list rather than
    /// an error; partial catalogs are expected during streaming loads.
    pub fn find_targets(&self, key: Option<&str>) -> Vec<TargetBinding> {
        let key = match key {
            Some(key) => key,
            None => return Vec::new(),
        };
        let slots = self.targets_by_group(key);
        if slots.is_empty() {
            log::debug!("no targets found for group key {:?}", key);
        }
        slots
            .iter()
            .map(|&slot| {
                let meta = &self.targets[slot];
                let mut dependencies = meta.variables.clone();
                dependencies.push(meta.group.clone());
                TargetBinding {
                    slot,
                    path: meta.path.clone(),
                    dependencies,
                }
            })
            .collect()
    }
}
