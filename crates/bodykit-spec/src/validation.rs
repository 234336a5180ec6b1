//! Modifier-library validation against a target catalog.

use std::collections::HashMap;

use crate::catalog::TargetCatalog;
use crate::category::MacroCategory;
use crate::error::{ErrorCode, ValidationError, ValidationResult, ValidationWarning, WarningCode};
use crate::library::{ModifierDef, ModifierLibrary};

/// Resolves the macro category a macro-variable name drives.
///
/// The lower-cased name may be a category name (`Age` drives `age`) or a tag
/// (`African` drives `race`, the category the tag belongs to).
pub fn resolve_macro_variable(name: &str) -> Option<MacroCategory> {
    let lower = name.to_lowercase();
    lower
        .parse::<MacroCategory>()
        .ok()
        .or_else(|| MacroCategory::of_tag(&lower))
}

/// Validates a modifier library against a catalog.
///
/// Errors are structural problems in the library itself: empty definitions,
/// unknown modifier types, duplicate names, unresolved or conflicting macro
/// variables. Missing target groups are warnings only; a partially loaded
/// catalog is an expected condition, not a defect in the library.
pub fn validate_library(library: &ModifierLibrary, catalog: &TargetCatalog) -> ValidationResult {
    let mut result = ValidationResult::new();
    let mut seen_names: HashMap<String, ()> = HashMap::new();
    let mut var_owners: HashMap<MacroCategory, String> = HashMap::new();

    for group in library.groups() {
        if group.modifiers.is_empty() {
            result.add_warning(ValidationWarning::with_subject(
                WarningCode::EmptyGroup,
                "group defines no modifiers",
                group.group.clone(),
            ));
        }

        for def in &group.modifiers {
            validate_def(def, &group.group, catalog, &mut result);

            if let Some(full_name) = def.full_name(&group.group) {
                if seen_names.insert(full_name.clone(), ()).is_some() {
                    result.add_error(ValidationError::with_subject(
                        ErrorCode::DuplicateModifier,
                        "modifier is defined more than once",
                        full_name,
                    ));
                }
            }

            if let Some(macrovar) = &def.macrovar {
                if let Some(category) = resolve_macro_variable(macrovar) {
                    match var_owners.get(&category) {
                        Some(owner) if owner != &group.group => {
                            result.add_error(ValidationError::with_subject(
                                ErrorCode::MacroVariableConflict,
                                format!(
                                    "macro variable '{}' is already owned by group '{}'",
                                    category, owner
                                ),
                                group.group.clone(),
                            ));
                        }
                        Some(_) => {}
                        None => {
                            var_owners.insert(category, group.group.clone());
                        }
                    }
                }
            }
        }
    }

    result
}

fn validate_def(
    def: &ModifierDef,
    group: &str,
    catalog: &TargetCatalog,
    result: &mut ValidationResult,
) {
    let subject = def
        .full_name(group)
        .unwrap_or_else(|| format!("{}/?", group));

    if def.macrovar.is_none() && def.target.is_none() {
        result.add_error(ValidationError::with_subject(
            ErrorCode::EmptyModifierDef,
            "definition names neither a target nor a macro variable",
            subject,
        ));
        return;
    }

    if let Some(kind) = &def.modifier_type {
        if kind != "EthnicModifier" {
            result.add_error(ValidationError::with_subject(
                ErrorCode::UnknownModifierType,
                format!("unknown modifier type '{}'", kind),
                subject.clone(),
            ));
        }
    }

    if let Some(macrovar) = &def.macrovar {
        if resolve_macro_variable(macrovar).is_none() {
            result.add_error(ValidationError::with_subject(
                ErrorCode::UnresolvedMacroVariable,
                format!(
                    "macro variable '{}' matches no category or tag",
                    macrovar
                ),
                subject.clone(),
            ));
        }
        // Macro modifiers control the targets of their whole group.
        if catalog.targets_by_group(group).is_empty() {
            result.add_warning(ValidationWarning::with_subject(
                WarningCode::UnknownTargetGroup,
                format!("no catalog targets for group '{}'", group),
                subject,
            ));
        }
        return;
    }

    if let Some(names) = def.universal_names(group) {
        let bound = [
            names.left.as_deref(),
            Some(names.right.as_str()),
            names.center.as_deref(),
        ]
        .into_iter()
        .flatten()
        .map(|key| catalog.targets_by_group(key).len())
        .sum::<usize>();
        if bound == 0 {
            result.add_warning(ValidationWarning::with_subject(
                WarningCode::UnknownTargetGroup,
                format!("no catalog targets for any side of '{}'", names.name),
                subject,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::ModifierGroupDef;
    use pretty_assertions::assert_eq;

    fn catalog() -> TargetCatalog {
        TargetCatalog::from_paths([
            "data/targets/macrodetails/caucasian-female-young.target",
            "data/targets/breast/breast-trans-vert-down.target",
            "data/targets/breast/breast-trans-vert-up.target",
        ])
    }

    fn library(json: &str) -> ModifierLibrary {
        ModifierLibrary::from_json(json).unwrap()
    }

    #[test]
    fn test_resolve_macro_variable() {
        assert_eq!(resolve_macro_variable("Age"), Some(MacroCategory::Age));
        assert_eq!(resolve_macro_variable("African"), Some(MacroCategory::Race));
        assert_eq!(
            resolve_macro_variable("BodyProportions"),
            Some(MacroCategory::BodyProportions)
        );
        assert_eq!(resolve_macro_variable("Nose"), None);
    }

    #[test]
    fn test_valid_library() {
        let lib = library(
            r#"[
                {"group": "macrodetails", "modifiers": [{"macrovar": "Age"}]},
                {"group": "breast", "modifiers": [
                    {"target": "breast-trans-vert", "min": "down", "max": "up"}
                ]}
            ]"#,
        );
        let result = validate_library(&lib, &catalog());
        assert!(result.is_ok(), "errors: {:?}", result.errors);
        assert!(result.warnings.is_empty(), "warnings: {:?}", result.warnings);
    }

    #[test]
    fn test_empty_def_is_error() {
        let lib = library(r#"[{"group": "breast", "modifiers": [{}]}]"#);
        let result = validate_library(&lib, &catalog());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, ErrorCode::EmptyModifierDef);
    }

    #[test]
    fn test_unknown_modifier_type_is_error() {
        let lib = library(
            r#"[{"group": "macrodetails", "modifiers": [
                {"macrovar": "African", "modifierType": "RaceModifier"}
            ]}]"#,
        );
        let result = validate_library(&lib, &catalog());
        assert_eq!(result.errors[0].code, ErrorCode::UnknownModifierType);
    }

    #[test]
    fn test_duplicate_modifier_is_error() {
        let lib = library(
            r#"[{"group": "breast", "modifiers": [
                {"target": "breast-trans-vert", "min": "down", "max": "up"},
                {"target": "breast-trans-vert", "min": "down", "max": "up"}
            ]}]"#,
        );
        let result = validate_library(&lib, &catalog());
        assert_eq!(result.errors[0].code, ErrorCode::DuplicateModifier);
    }

    #[test]
    fn test_macro_variable_conflict_is_error() {
        let lib = library(
            r#"[
                {"group": "macrodetails", "modifiers": [{"macrovar": "Age"}]},
                {"group": "other-group", "modifiers": [{"macrovar": "Age"}]}
            ]"#,
        );
        let result = validate_library(&lib, &catalog());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, ErrorCode::MacroVariableConflict);
        assert_eq!(result.errors[0].subject.as_deref(), Some("other-group"));
    }

    #[test]
    fn test_unknown_target_group_is_warning() {
        let lib = library(
            r#"[{"group": "nose", "modifiers": [
                {"target": "nose-scale", "min": "decr", "max": "incr"}
            ]}]"#,
        );
        let result = validate_library(&lib, &catalog());
        assert!(result.is_ok());
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].code, WarningCode::UnknownTargetGroup);
    }

    #[test]
    fn test_empty_group_is_warning() {
        let lib = ModifierLibrary(vec![ModifierGroupDef {
            group: "torso".to_string(),
            modifiers: vec![],
        }]);
        let result = validate_library(&lib, &catalog());
        assert!(result.is_ok());
        assert_eq!(result.warnings[0].code, WarningCode::EmptyGroup);
    }
}
