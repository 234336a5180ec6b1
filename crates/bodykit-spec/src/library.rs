//! Modifier library definitions.
//!
//! A modifier library is the JSON document describing every user-facing
//! slider: an array of groups, each holding modifier definitions. A
//! definition is either target-based (`target` plus optional `min`/`max`/
//! `mid` extensions naming the left/right/center targets of one axis) or
//! macro (`macrovar` naming the factor it drives, optionally typed
//! `EthnicModifier`). Extra keys in the source data are tolerated.

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// A whole modifier library: ordered list of groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModifierLibrary(pub Vec<ModifierGroupDef>);

/// One modifier group and its member definitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierGroupDef {
    /// Group name, e.g. `macrodetails-universal` or `breast`.
    pub group: String,
    /// Member modifier definitions.
    pub modifiers: Vec<ModifierDef>,
}

/// A single modifier definition.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModifierDef {
    /// Base target name for target-based modifiers, e.g. `breast-trans-vert`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// Left-target extension, e.g. `down`, `decr`, `less`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<String>,

    /// Right-target extension, e.g. `up`, `incr`, `more`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,

    /// Center-target extension, e.g. `normal`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mid: Option<String>,

    /// Macro variable name for macro modifiers, e.g. `Age` or `African`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub macrovar: Option<String>,

    /// Modifier type override; `EthnicModifier` is the only recognized value.
    #[serde(
        default,
        rename = "modifierType",
        skip_serializing_if = "Option::is_none"
    )]
    pub modifier_type: Option<String>,

    /// Default value override.
    #[serde(
        default,
        rename = "defaultValue",
        skip_serializing_if = "Option::is_none"
    )]
    pub default_value: Option<f64>,
}

impl ModifierLibrary {
    /// Parses a library from JSON.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the library to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Iterates over all groups.
    pub fn groups(&self) -> impl Iterator<Item = &ModifierGroupDef> {
        self.0.iter()
    }

    /// Total number of modifier definitions across all groups.
    pub fn modifier_count(&self) -> usize {
        self.0.iter().map(|g| g.modifiers.len()).sum()
    }
}

/// Resolved target names for a target-based modifier.
///
/// The base target name is `{group}-{target}`; extensions append to it. With
/// no extensions the base itself acts as the right-side target. The modifier
/// name lists the extensions joined with `|` so a slider like
/// `breast/breast-trans-vert-down|up` is self-describing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniversalNames {
    /// Modifier name within its group.
    pub name: String,
    /// Left target name, present when a `min` extension is declared.
    pub left: Option<String>,
    /// Right target name; always present.
    pub right: String,
    /// Center target name, present when a `mid` extension is declared.
    pub center: Option<String>,
}

impl ModifierDef {
    /// Returns true if this is a macro (factor-driving) definition.
    pub fn is_macro(&self) -> bool {
        self.macrovar.is_some()
    }

    /// Returns true if this definition is explicitly typed as ethnic.
    pub fn is_ethnic(&self) -> bool {
        self.modifier_type.as_deref() == Some("EthnicModifier")
    }

    /// Resolves the modifier name and its left/right/center target names for
    /// a target-based definition. Returns `None` for macro definitions or
    /// definitions without a target.
    pub fn universal_names(&self, group: &str) -> Option<UniversalNames> {
        if self.is_macro() {
            return None;
        }
        let target = self.target.as_deref()?;
        let base = format!("{}-{}", group, target);

        let left = self.min.as_deref().map(|ext| format!("{}-{}", base, ext));
        let right = self.max.as_deref().map(|ext| format!("{}-{}", base, ext));
        let center = self.mid.as_deref().map(|ext| format!("{}-{}", base, ext));

        Some(match (left.is_some(), right.is_some(), center.is_some()) {
            (true, true, true) => UniversalNames {
                name: format!(
                    "{}-{}|{}|{}",
                    target,
                    self.min.as_deref().unwrap(),
                    self.mid.as_deref().unwrap(),
                    self.max.as_deref().unwrap()
                ),
                left,
                right: right.unwrap(),
                center,
            },
            (true, true, false) => UniversalNames {
                name: format!(
                    "{}-{}|{}",
                    target,
                    self.min.as_deref().unwrap(),
                    self.max.as_deref().unwrap()
                ),
                left,
                right: right.unwrap(),
                center: None,
            },
            // A single un-extended target acts as the right side.
            _ => UniversalNames {
                name: target.to_string(),
                left,
                right: base,
                center,
            },
        })
    }

    /// Resolves the full name (`{group}/{name}`) of this definition, or
    /// `None` when the definition names neither a macro variable nor a
    /// target.
    pub fn full_name(&self, group: &str) -> Option<String> {
        if let Some(macrovar) = &self.macrovar {
            return Some(format!("{}/{}", group, macrovar));
        }
        self.universal_names(group)
            .map(|names| format!("{}/{}", group, names.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_library() {
        let json = r#"[
            {
                "group": "macrodetails",
                "modifiers": [
                    {"macrovar": "Gender"},
                    {"macrovar": "Age"},
                    {"macrovar": "African", "modifierType": "EthnicModifier", "defaultValue": 0.3333333333333333}
                ]
            },
            {
                "group": "breast",
                "modifiers": [
                    {"target": "breast-trans-vert", "min": "down", "max": "up", "cameraView": "frontView"}
                ]
            }
        ]"#;
        let library = ModifierLibrary::from_json(json).unwrap();
        assert_eq!(library.0.len(), 2);
        assert_eq!(library.modifier_count(), 4);

        let macros = &library.0[0].modifiers;
        assert!(macros[0].is_macro());
        assert!(!macros[0].is_ethnic());
        assert!(macros[2].is_ethnic());
        assert_eq!(macros[2].default_value, Some(1.0 / 3.0));

        let universal = &library.0[1].modifiers[0];
        assert!(!universal.is_macro());
        assert_eq!(universal.target.as_deref(), Some("breast-trans-vert"));
        assert_eq!(universal.min.as_deref(), Some("down"));
        assert_eq!(universal.mid, None);
    }

    #[test]
    fn test_universal_names() {
        let def = ModifierDef {
            target: Some("breast-trans-vert".to_string()),
            min: Some("down".to_string()),
            max: Some("up".to_string()),
            ..Default::default()
        };
        let names = def.universal_names("breast").unwrap();
        assert_eq!(names.name, "breast-trans-vert-down|up");
        assert_eq!(names.left.as_deref(), Some("breast-breast-trans-vert-down"));
        assert_eq!(names.right, "breast-breast-trans-vert-up");
        assert_eq!(names.center, None);
        assert_eq!(
            def.full_name("breast").as_deref(),
            Some("breast/breast-trans-vert-down|up")
        );
    }

    #[test]
    fn test_universal_names_three_targets() {
        let def = ModifierDef {
            target: Some("nose-shape".to_string()),
            min: Some("less".to_string()),
            max: Some("more".to_string()),
            mid: Some("normal".to_string()),
            ..Default::default()
        };
        let names = def.universal_names("nose").unwrap();
        assert_eq!(names.name, "nose-shape-less|normal|more");
        assert_eq!(names.center.as_deref(), Some("nose-nose-shape-normal"));
    }

    #[test]
    fn test_universal_names_single_target() {
        let def = ModifierDef {
            target: Some("chin-triangle".to_string()),
            ..Default::default()
        };
        let names = def.universal_names("chin").unwrap();
        assert_eq!(names.name, "chin-triangle");
        assert_eq!(names.left, None);
        assert_eq!(names.right, "chin-chin-triangle");
    }

    #[test]
    fn test_full_name_macro() {
        let def = ModifierDef {
            macrovar: Some("Age".to_string()),
            ..Default::default()
        };
        assert_eq!(
            def.full_name("macrodetails").as_deref(),
            Some("macrodetails/Age")
        );
        assert_eq!(def.universal_names("macrodetails"), None);
    }

    #[test]
    fn test_round_trip() {
        let library = ModifierLibrary(vec![ModifierGroupDef {
            group: "stomach".to_string(),
            modifiers: vec![ModifierDef {
                target: Some("stomach-pregnant".to_string()),
                min: Some("decr".to_string()),
                max: Some("incr".to_string()),
                ..Default::default()
            }],
        }]);
        let json = library.to_json_pretty().unwrap();
        let parsed = ModifierLibrary::from_json(&json).unwrap();
        assert_eq!(parsed, library);
    }
}
