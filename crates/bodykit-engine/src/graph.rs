//! The modifier set and its macro dependency graph.
//!
//! The graph answers two questions: which group owns each macro variable
//! (forward), and which groups must refresh when a variable changes
//! (reverse). Both maps are built in two explicit passes over the library so
//! construction is independent of definition order.

use std::collections::HashMap;

use bodykit_spec::{MacroCategory, ModifierLibrary, TargetCatalog};

use crate::modifier::Modifier;

/// Groups refreshed during realtime (interactive drag) propagation.
pub const REALTIME_GROUPS: [&str; 2] = ["macrodetails", "macrodetails-universal"];

/// A diagnostic raised while building the modifier set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphIssue {
    /// Two groups claim the same macro variable; the first claim wins.
    MacroVariableConflict {
        /// The contested variable.
        variable: MacroCategory,
        /// The group that keeps ownership.
        kept: String,
        /// The group whose claim was dropped.
        rejected: String,
    },
    /// A modifier full name occurred twice; the first definition wins.
    DuplicateModifier {
        /// The repeated full name.
        full_name: String,
    },
    /// A definition could not be turned into a modifier and was skipped.
    SkippedDefinition {
        /// The group the definition belongs to.
        group: String,
    },
    /// A modifier controls no targets present in the catalog.
    MissingTargets {
        /// The affected modifier.
        modifier: String,
    },
}

impl std::fmt::Display for GraphIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphIssue::MacroVariableConflict {
                variable,
                kept,
                rejected,
            } => write!(
                f,
                "multiple modifier groups setting var {} ({} and {})",
                variable, kept, rejected
            ),
            GraphIssue::DuplicateModifier { full_name } => {
                write!(f, "modifier {} is already attached", full_name)
            }
            GraphIssue::SkippedDefinition { group } => {
                write!(f, "skipped an unusable modifier definition in group {}", group)
            }
            GraphIssue::MissingTargets { modifier } => {
                write!(f, "modifier {} controls no loaded targets", modifier)
            }
        }
    }
}

/// Diagnostics collected while building a modifier set.
#[derive(Debug, Clone, Default)]
pub struct GraphReport {
    /// All issues in build order.
    pub issues: Vec<GraphIssue>,
}

impl GraphReport {
    /// Returns true if no issues were raised.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// All modifiers of one character, keyed by full name, plus the macro
/// variable dependency maps. Immutable once built.
#[derive(Debug, Clone)]
pub struct ModifierSet {
    modifiers: Vec<Modifier>,
    by_name: HashMap<String, usize>,
    group_members: HashMap<String, Vec<usize>>,
    var_owner: HashMap<MacroCategory, String>,
    dependents: HashMap<MacroCategory, Vec<String>>,
}

impl ModifierSet {
    /// Builds the set from a library against a catalog.
    ///
    /// Pass 1 registers every macro variable's owning group; pass 2 adds the
    /// reverse edges, skipping edges that would point back into the owning
    /// group. Conflicts keep the first registration and are reported.
    pub fn build(library: &ModifierLibrary, catalog: &TargetCatalog) -> (Self, GraphReport) {
        let mut report = GraphReport::default();

        let mut modifiers: Vec<Modifier> = Vec::with_capacity(library.modifier_count());
        let mut by_name: HashMap<String, usize> = HashMap::new();
        let mut group_members: HashMap<String, Vec<usize>> = HashMap::new();

        for group in library.groups() {
            for def in &group.modifiers {
                let modifier = match Modifier::from_def(&group.group, def, catalog) {
                    Some(modifier) => modifier,
                    None => {
                        log::warn!("skipping unusable modifier definition in group {}", group.group);
                        report.issues.push(GraphIssue::SkippedDefinition {
                            group: group.group.clone(),
                        });
                        continue;
                    }
                };

                if by_name.contains_key(&modifier.full_name) {
                    log::error!("modifier {} is already attached", modifier.full_name);
                    report.issues.push(GraphIssue::DuplicateModifier {
                        full_name: modifier.full_name,
                    });
                    continue;
                }

                if modifier.targets.is_empty() {
                    // Expected during partial loads; the modifier stays
                    // addressable but writes nothing.
                    log::debug!("modifier {} controls no loaded targets", modifier.full_name);
                    report.issues.push(GraphIssue::MissingTargets {
                        modifier: modifier.full_name.clone(),
                    });
                }

                let index = modifiers.len();
                by_name.insert(modifier.full_name.clone(), index);
                group_members
                    .entry(modifier.group.clone())
                    .or_default()
                    .push(index);
                modifiers.push(modifier);
            }
        }

        // Pass 1: macro variable owners.
        let mut var_owner: HashMap<MacroCategory, String> = HashMap::new();
        for modifier in &modifiers {
            if let Some(variable) = modifier.macro_variable {
                match var_owner.get(&variable) {
                    Some(owner) if owner != &modifier.group => {
                        log::error!(
                            "multiple modifier groups setting var {} ({} and {})",
                            variable,
                            owner,
                            modifier.group
                        );
                        report.issues.push(GraphIssue::MacroVariableConflict {
                            variable,
                            kept: owner.clone(),
                            rejected: modifier.group.clone(),
                        });
                    }
                    Some(_) => {}
                    None => {
                        var_owner.insert(variable, modifier.group.clone());
                    }
                }
            }
        }

        // Pass 2: reverse edges, excluding edges into the owning group.
        let mut dependents: HashMap<MacroCategory, Vec<String>> = HashMap::new();
        for modifier in &modifiers {
            if modifier.macro_variable.is_none() {
                continue;
            }
            for dependency in &modifier.macro_dependencies {
                if var_owner.get(dependency) == Some(&modifier.group) {
                    continue;
                }
                let groups = dependents.entry(*dependency).or_default();
                if !groups.contains(&modifier.group) {
                    groups.push(modifier.group.clone());
                }
            }
        }

        (
            Self {
                modifiers,
                by_name,
                group_members,
                var_owner,
                dependents,
            },
            report,
        )
    }

    /// Number of modifiers.
    pub fn len(&self) -> usize {
        self.modifiers.len()
    }

    /// Returns true if the set holds no modifiers.
    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty()
    }

    /// Looks up a modifier by full name.
    pub fn get(&self, full_name: &str) -> Option<&Modifier> {
        self.by_name.get(full_name).map(|&i| &self.modifiers[i])
    }

    /// Iterates all modifiers in definition order.
    pub fn iter(&self) -> impl Iterator<Item = &Modifier> {
        self.modifiers.iter()
    }

    /// All modifiers of a group, in definition order.
    pub fn by_group(&self, group: &str) -> Vec<&Modifier> {
        self.group_members
            .get(group)
            .map(|members| members.iter().map(|&i| &self.modifiers[i]).collect())
            .unwrap_or_default()
    }

    /// The group that owns a macro variable.
    pub fn variable_owner(&self, variable: MacroCategory) -> Option<&str> {
        self.var_owner.get(&variable).map(String::as_str)
    }

    /// The representative modifier used to refresh a whole group: the first
    /// macro modifier when the group has one (macro modifiers share the
    /// group-level target set), else the first modifier.
    pub fn group_representative(&self, group: &str) -> Option<&Modifier> {
        let members = self.group_members.get(group)?;
        members
            .iter()
            .map(|&i| &self.modifiers[i])
            .find(|m| m.is_macro())
            .or_else(|| members.first().map(|&i| &self.modifiers[i]))
    }

    /// Reverse dependency lookup: the groups whose targets must refresh when
    /// a macro variable changes. With `realtime` the result is narrowed to
    /// the interactive macro groups.
    pub fn affected_groups(&self, variable: MacroCategory, realtime: bool) -> Vec<String> {
        let groups = match self.dependents.get(&variable) {
            Some(groups) => groups.clone(),
            None => return Vec::new(),
        };
        if realtime {
            groups
                .into_iter()
                .filter(|g| REALTIME_GROUPS.contains(&g.as_str()))
                .collect()
        } else {
            groups
        }
    }

    /// Forward dependency lookup: the owning groups of every macro variable
    /// a modifier's targets depend on, excluding its own group. Variables
    /// with no owner are logged and skipped.
    pub fn modifier_dependencies(
        &self,
        modifier: &Modifier,
        filter: Option<&[&str]>,
    ) -> Vec<String> {
        let mut result: Vec<String> = Vec::new();
        for variable in &modifier.macro_dependencies {
            let owner = match self.var_owner.get(variable) {
                Some(owner) => owner,
                None => {
                    log::error!("modifier dependency map: var {} not mapped", variable);
                    continue;
                }
            };
            if owner == &modifier.group {
                continue;
            }
            if let Some(filter) = filter {
                if !filter.contains(&owner.as_str()) {
                    continue;
                }
            }
            if !result.contains(owner) {
                result.push(owner.clone());
            }
        }
        result
    }
}
