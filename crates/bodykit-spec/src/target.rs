//! Target path parsing.
//!
//! A morph target is identified by its file path, e.g.
//! `data/targets/macrodetails/height/female-old-averagemuscle-averageweight-minheight.target`.
//! The path is tokenized; tokens found in the macro tag vocabulary become the
//! target's category tags, and the remaining tokens joined with `-` form its
//! group string (here `macrodetails-height`).

use std::collections::BTreeMap;

use crate::category::MacroCategory;

/// Parsed metadata for a single morph target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetMeta {
    /// Canonical identity: the full input path, lower-cased.
    pub path: String,
    /// Residual group string after category tags are stripped.
    pub group: String,
    /// Category tags found in the path, keyed by owning category.
    pub categories: BTreeMap<MacroCategory, String>,
    /// Sorted list of category tags present in the path.
    pub variables: Vec<String>,
    /// Sorted list of categories present in the path.
    pub macro_variables: Vec<MacroCategory>,
}

impl TargetMeta {
    /// Returns the tag recorded for a category, if the path carries one.
    pub fn category_tag(&self, category: MacroCategory) -> Option<&str> {
        self.categories.get(&category).map(String::as_str)
    }
}

/// Parses a target path into group and category metadata.
///
/// The path is lower-cased, the leading directories up to and including a
/// `targets/` component are stripped, and a `.target` extension is removed.
/// The remainder is split on `/`, `_`, `,` and `-`; tokens matching the tag
/// vocabulary are extracted into categories, everything else forms the group.
/// Unrecognized tokens are kept in the group, never rejected.
pub fn parse_path(path: &str) -> TargetMeta {
    let lower = path.to_lowercase();

    // Strip everything up to the last `targets/` directory component.
    let short = match lower.rfind("targets/") {
        Some(i) if i > 0 => &lower[i + "targets/".len()..],
        _ => lower.as_str(),
    };
    let stem = short.strip_suffix(".target").unwrap_or(short);

    let mut group_tokens: Vec<&str> = Vec::new();
    let mut categories: BTreeMap<MacroCategory, String> = BTreeMap::new();

    for token in stem.split(['/', '_', ',', '-']) {
        if let Some(category) = MacroCategory::of_tag(token) {
            categories.insert(category, token.to_string());
        } else {
            group_tokens.push(token);
        }
    }

    let mut variables: Vec<String> = categories.values().cloned().collect();
    variables.sort();
    let macro_variables: Vec<MacroCategory> = categories.keys().copied().collect();

    TargetMeta {
        path: lower.clone(),
        group: group_tokens.join("-"),
        categories,
        variables,
        macro_variables,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_macro_target() {
        let meta = parse_path(
            "data/targets/macrodetails/height/female-old-averagemuscle-averageweight-minheight.target",
        );
        assert_eq!(meta.group, "macrodetails-height");
        assert_eq!(meta.category_tag(MacroCategory::Gender), Some("female"));
        assert_eq!(meta.category_tag(MacroCategory::Age), Some("old"));
        assert_eq!(meta.category_tag(MacroCategory::Height), Some("minheight"));
        assert_eq!(meta.category_tag(MacroCategory::Race), None);
        assert_eq!(
            meta.variables,
            vec![
                "averagemuscle",
                "averageweight",
                "female",
                "minheight",
                "old"
            ]
        );
        assert_eq!(
            meta.macro_variables,
            vec![
                MacroCategory::Age,
                MacroCategory::Gender,
                MacroCategory::Height,
                MacroCategory::Muscle,
                MacroCategory::Weight
            ]
        );
    }

    #[test]
    fn test_parse_keeps_unknown_tokens_in_group() {
        let meta = parse_path("data/targets/nose/nose-nostrils-angle-up.target");
        assert_eq!(meta.group, "nose-nose-nostrils-angle-up");
        assert!(meta.categories.is_empty());
        assert!(meta.variables.is_empty());
    }

    #[test]
    fn test_parse_lowercases_and_keeps_full_path_identity() {
        let meta = parse_path("Data/Targets/Macrodetails/Caucasian-Female-Young.target");
        assert_eq!(
            meta.path,
            "data/targets/macrodetails/caucasian-female-young.target"
        );
        assert_eq!(meta.group, "macrodetails");
        assert_eq!(meta.variables, vec!["caucasian", "female", "young"]);
    }

    #[test]
    fn test_parse_without_targets_prefix() {
        let meta = parse_path("macrodetails/universal-female-young-maxmuscle-averageweight");
        assert_eq!(meta.group, "macrodetails-universal");
        assert_eq!(meta.category_tag(MacroCategory::Muscle), Some("maxmuscle"));
    }

    #[test]
    fn test_parse_splits_on_underscore_and_comma() {
        let meta = parse_path("armslegs,r_upperarm-fat-decr");
        assert_eq!(meta.group, "armslegs-r-upperarm-fat-decr");
    }
}
