//! Runtime modifiers.
//!
//! A modifier is one user-facing slider. Universal modifiers drive one axis
//! of up to three targets (left/center/right); macro modifiers delegate their
//! scalar to a factor field and drive their whole group's target set; ethnic
//! modifiers are macro modifiers over one leg of the ethnic triple.
//!
//! A modifier never owns mutable state. Its value lives either in the dense
//! target-value array (universal) or in `Factors` (macro/ethnic); weight
//! computation is a pure function of `(value, factors)`.

use std::collections::BTreeSet;

use bodykit_spec::{
    resolve_macro_variable, MacroCategory, ModifierDef, TargetBinding, TargetCatalog,
};

use crate::factors::{EthnicTag, Factors, MacroField};

/// Variant-specific modifier data.
#[derive(Debug, Clone)]
pub enum ModifierKind {
    /// Target-based slider over one axis.
    Universal {
        /// Left target name, when the axis is bipolar.
        left: Option<String>,
        /// Right target name.
        right: String,
        /// Center target name, when a rest pose target exists.
        center: Option<String>,
        /// Bindings of the left target group.
        l_targets: Vec<TargetBinding>,
        /// Bindings of the right target group.
        r_targets: Vec<TargetBinding>,
        /// Bindings of the center target group.
        c_targets: Vec<TargetBinding>,
    },
    /// Factor-delegating slider.
    Macro {
        /// The factor field this modifier drives.
        field: MacroField,
    },
    /// Macro slider over one leg of the ethnic triple.
    Ethnic {
        /// The driven leg.
        tag: EthnicTag,
    },
}

/// Computed weights for a modifier's targets plus unresolved dependency
/// names (each substituted with neutral weight 1.0).
#[derive(Debug, Clone, Default)]
pub struct TargetWeights {
    /// `(slot, weight)` pairs in binding order.
    pub entries: Vec<(usize, f64)>,
    /// Dependency names no factor component could be found for.
    pub unresolved: Vec<String>,
}

/// One user-facing slider.
#[derive(Debug, Clone)]
pub struct Modifier {
    /// Unique identity, `{group}/{name}`.
    pub full_name: String,
    /// Owning group name.
    pub group: String,
    /// Name within the group.
    pub name: String,
    /// Variant data.
    pub kind: ModifierKind,
    /// Lower bound; -1 for bipolar universal sliders, else 0.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
    /// Reset value.
    pub default_value: f64,
    /// All controlled target bindings.
    pub targets: Vec<TargetBinding>,
    /// The macro variable this modifier owns, if any.
    pub macro_variable: Option<MacroCategory>,
    /// Macro variables this modifier's target weights depend on.
    pub macro_dependencies: Vec<MacroCategory>,
}

/// Union of the macro variables the targets of a group depend on.
fn find_macro_dependencies(catalog: &TargetCatalog, key: Option<&str>) -> BTreeSet<MacroCategory> {
    let key = match key {
        Some(key) => key,
        None => return BTreeSet::new(),
    };
    catalog
        .targets_by_group(key)
        .iter()
        .flat_map(|&slot| catalog.target(slot).macro_variables.iter().copied())
        .collect()
}

impl Modifier {
    /// Builds a runtime modifier from a library definition. Returns `None`
    /// for definitions that name neither a resolvable macro variable nor a
    /// target; `validate_library` reports those.
    pub fn from_def(group: &str, def: &ModifierDef, catalog: &TargetCatalog) -> Option<Modifier> {
        if let Some(macrovar) = &def.macrovar {
            return Self::macro_from_def(group, macrovar, def, catalog);
        }
        Self::universal_from_def(group, def, catalog)
    }

    fn macro_from_def(
        group: &str,
        macrovar: &str,
        def: &ModifierDef,
        catalog: &TargetCatalog,
    ) -> Option<Modifier> {
        let variable = resolve_macro_variable(macrovar)?;

        let kind = if variable == MacroCategory::Race {
            ModifierKind::Ethnic {
                tag: EthnicTag::from_tag(&macrovar.to_lowercase())?,
            }
        } else {
            ModifierKind::Macro {
                field: MacroField::from_category(variable)?,
            }
        };

        let default_value = def.default_value.unwrap_or(if def.is_ethnic() {
            1.0 / 3.0
        } else {
            0.5
        });

        let targets = catalog.find_targets(Some(group));
        let mut macro_dependencies = find_macro_dependencies(catalog, Some(group));
        // A macro modifier is not dependent on the variable it controls.
        macro_dependencies.remove(&variable);

        Some(Modifier {
            full_name: format!("{}/{}", group, macrovar),
            group: group.to_string(),
            name: macrovar.to_string(),
            kind,
            min: 0.0,
            max: 1.0,
            default_value,
            targets,
            macro_variable: Some(variable),
            macro_dependencies: macro_dependencies.into_iter().collect(),
        })
    }

    fn universal_from_def(
        group: &str,
        def: &ModifierDef,
        catalog: &TargetCatalog,
    ) -> Option<Modifier> {
        let names = def.universal_names(group)?;

        let l_targets = catalog.find_targets(names.left.as_deref());
        let r_targets = catalog.find_targets(Some(names.right.as_str()));
        let c_targets = catalog.find_targets(names.center.as_deref());

        let mut macro_dependencies = find_macro_dependencies(catalog, names.left.as_deref());
        macro_dependencies.extend(find_macro_dependencies(catalog, Some(names.right.as_str())));
        macro_dependencies.extend(find_macro_dependencies(catalog, names.center.as_deref()));

        let mut targets = l_targets.clone();
        targets.extend(r_targets.iter().cloned());
        targets.extend(c_targets.iter().cloned());

        let min = if names.left.is_some() { -1.0 } else { 0.0 };

        Some(Modifier {
            full_name: format!("{}/{}", group, names.name),
            group: group.to_string(),
            name: names.name.clone(),
            min,
            max: 1.0,
            default_value: def.default_value.unwrap_or(0.0),
            kind: ModifierKind::Universal {
                left: names.left,
                right: names.right,
                center: names.center,
                l_targets,
                r_targets,
                c_targets,
            },
            targets,
            macro_variable: None,
            macro_dependencies: macro_dependencies.into_iter().collect(),
        })
    }

    /// Returns true for macro and ethnic modifiers.
    pub fn is_macro(&self) -> bool {
        self.macro_variable.is_some()
    }

    /// Clamps a value into this modifier's range.
    pub fn clamp_value(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// Resolves one dependency name to its current weight.
    ///
    /// Component tags resolve through factors; a universal modifier's own
    /// left/right/center names resolve to the activation split of `value`;
    /// a macro modifier's own group name resolves to 1.
    fn resolve_factor(&self, dependency: &str, value: f64, factors: &Factors) -> Option<f64> {
        if let Some(component) = factors.component(dependency) {
            return Some(component);
        }
        match &self.kind {
            ModifierKind::Universal {
                left,
                right,
                center,
                ..
            } => {
                if left.as_deref() == Some(dependency) {
                    return Some(-value.min(0.0));
                }
                if right == dependency {
                    return Some(value.max(0.0));
                }
                if center.as_deref() == Some(dependency) {
                    return Some(1.0 - value.abs());
                }
                None
            }
            ModifierKind::Macro { .. } | ModifierKind::Ethnic { .. } => {
                if dependency == self.group {
                    Some(1.0)
                } else {
                    None
                }
            }
        }
    }

    /// Computes the weight of every controlled target for a slider value.
    ///
    /// Each target's weight is the product of its resolved dependency
    /// factors. Unresolved names contribute neutral weight 1.0 and are
    /// returned for diagnostics.
    pub fn target_weights(&self, value: f64, factors: &Factors) -> TargetWeights {
        let mut weights = TargetWeights {
            entries: Vec::with_capacity(self.targets.len()),
            ..Default::default()
        };

        for binding in &self.targets {
            let mut weight = 1.0;
            for dependency in &binding.dependencies {
                match self.resolve_factor(dependency, value, factors) {
                    Some(factor) => weight *= factor,
                    None => weights.unresolved.push(dependency.clone()),
                }
            }
            weights.entries.push((binding.slot, weight));
        }
        weights
    }

    /// Reads a universal modifier's value back from the stored target
    /// weights. The right side deliberately takes priority over the left.
    ///
    /// Returns 0 for macro modifiers, whose value lives in `Factors`.
    pub fn stored_value(&self, values: &[f32]) -> f64 {
        match &self.kind {
            ModifierKind::Universal {
                l_targets,
                r_targets,
                ..
            } => {
                let right: f64 = r_targets.iter().map(|b| values[b.slot] as f64).sum();
                if right != 0.0 {
                    right
                } else {
                    -l_targets.iter().map(|b| values[b.slot] as f64).sum::<f64>()
                }
            }
            _ => 0.0,
        }
    }

    /// The side this modifier takes in a symmetric pair, from `l`/`r` name
    /// tokens; `None` when symmetry does not apply.
    pub fn symmetry_side(&self) -> Option<char> {
        for token in self.name.split('-') {
            match token {
                "l" => return Some('l'),
                "r" => return Some('r'),
                _ => {}
            }
        }
        None
    }

    /// Full name of the mirror modifier, with `l`/`r` name tokens swapped;
    /// `None` when symmetry does not apply.
    pub fn mirrored_full_name(&self) -> Option<String> {
        self.symmetry_side()?;
        let mirrored: Vec<&str> = self
            .name
            .split('-')
            .map(|token| match token {
                "l" => "r",
                "r" => "l",
                other => other,
            })
            .collect();
        Some(format!("{}/{}", self.group, mirrored.join("-")))
    }
}
