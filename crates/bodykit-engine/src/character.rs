//! The character aggregate.
//!
//! A `Character` owns one `Factors`, one `ModifierSet`, the dense per-target
//! value array (slot order = catalog order), and optionally the attached
//! blend data. All mutation happens through it, synchronously: within a
//! single `set_value` call, target weights are written before dependency
//! propagation starts, and propagation runs each dependent group with
//! further propagation suppressed so mutually dependent groups cannot
//! recurse.

use std::sync::Arc;

use bodykit_spec::{CharacterConfig, ModifierLibrary, TargetCatalog};

use crate::blend::{BakeOutcome, BlendEngine, TargetData};
use crate::error::{EngineError, EngineResult};
use crate::factors::Factors;
use crate::graph::{GraphReport, ModifierSet};
use crate::modifier::ModifierKind;

/// One morphable character instance.
///
/// Not internally synchronized: wrap each character in external
/// synchronization (one lock or one actor) when used from a concurrent
/// environment.
#[derive(Debug, Clone)]
pub struct Character {
    catalog: Arc<TargetCatalog>,
    modifiers: ModifierSet,
    factors: Factors,
    values: Vec<f32>,
    blend: Option<BlendEngine>,
}

impl Character {
    /// Builds a character from a catalog and a modifier library.
    ///
    /// The returned report carries graph-construction diagnostics. After the
    /// build, every macro modifier's target weights are computed once from
    /// the default factors so the value array starts consistent.
    pub fn new(catalog: Arc<TargetCatalog>, library: &ModifierLibrary) -> (Self, GraphReport) {
        let (modifiers, report) = ModifierSet::build(library, &catalog);
        let values = vec![0.0; catalog.len()];
        let mut character = Self {
            catalog,
            modifiers,
            factors: Factors::new(),
            values,
            blend: None,
        };
        character.refresh_macros();
        (character, report)
    }

    /// The target catalog this character is built against.
    pub fn catalog(&self) -> &TargetCatalog {
        &self.catalog
    }

    /// The modifier set.
    pub fn modifiers(&self) -> &ModifierSet {
        &self.modifiers
    }

    /// The macro factors.
    pub fn factors(&self) -> &Factors {
        &self.factors
    }

    /// Mutable access to the macro factors, for direct factor edits such as
    /// `set_age_years`. Factor edits do not rewrite target weights; use the
    /// owning modifier's `set_value` for that.
    pub fn factors_mut(&mut self) -> &mut Factors {
        &mut self.factors
    }

    /// The dense target weight array, in catalog slot order.
    pub fn target_values(&self) -> &[f32] {
        &self.values
    }

    /// Recomputes every macro modifier's target weights from the current
    /// factors, without propagation.
    fn refresh_macros(&mut self) {
        let names: Vec<String> = self
            .modifiers
            .iter()
            .filter(|m| m.is_macro())
            .map(|m| m.full_name.clone())
            .collect();
        for name in names {
            if let Ok(value) = self.value_of(&name) {
                // Known name, finite value: cannot fail.
                let _ = self.set_value_inner(&name, value, true, false);
            }
        }
    }

    /// Current value of a modifier: stored target weights for universal
    /// modifiers (right side priority), the factor field for macro ones.
    pub fn value_of(&self, full_name: &str) -> EngineResult<f64> {
        let modifier = self
            .modifiers
            .get(full_name)
            .ok_or_else(|| EngineError::UnknownModifier(full_name.to_string()))?;
        Ok(match &modifier.kind {
            ModifierKind::Universal { .. } => modifier.stored_value(&self.values),
            ModifierKind::Macro { field } => self.factors.field(*field),
            ModifierKind::Ethnic { tag } => self.factors.ethnic(*tag),
        })
    }

    /// Sets a modifier value and propagates to dependent modifier groups.
    pub fn set_value(&mut self, full_name: &str, value: f64) -> EngineResult<()> {
        self.set_value_inner(full_name, value, false, false)
    }

    /// Realtime variant of [`set_value`](Self::set_value): propagation is
    /// narrowed to the interactive macro groups, for use during slider
    /// drags.
    pub fn update_value(&mut self, full_name: &str, value: f64) -> EngineResult<()> {
        self.set_value_inner(full_name, value, false, true)
    }

    pub(crate) fn set_value_inner(
        &mut self,
        full_name: &str,
        value: f64,
        skip_dependencies: bool,
        realtime: bool,
    ) -> EngineResult<()> {
        if !value.is_finite() {
            return Err(EngineError::NonFiniteValue {
                modifier: full_name.to_string(),
            });
        }
        let modifier = self
            .modifiers
            .get(full_name)
            .ok_or_else(|| EngineError::UnknownModifier(full_name.to_string()))?;
        let value = modifier.clamp_value(value);

        // Macro modifiers write through to their factor first so the weight
        // computation below sees the new component weights.
        match &modifier.kind {
            ModifierKind::Macro { field } => self.factors.set_field(*field, value),
            ModifierKind::Ethnic { tag } => self.factors.set_ethnic(*tag, value),
            ModifierKind::Universal { .. } => {}
        }

        let weights = modifier.target_weights(value, &self.factors);
        if !weights.unresolved.is_empty() {
            log::warn!(
                "names not found in factors for modifier {}: {:?}",
                full_name,
                weights.unresolved
            );
        }
        for (slot, weight) in &weights.entries {
            self.values[*slot] = *weight as f32;
        }

        if skip_dependencies {
            return Ok(());
        }

        // Propagate: refresh one representative per affected group, with
        // further propagation suppressed.
        let variable = modifier.macro_variable;
        let affected = match variable {
            Some(variable) => self.modifiers.affected_groups(variable, realtime),
            None => Vec::new(),
        };
        for group in affected {
            let representative = match self.modifiers.group_representative(&group) {
                Some(representative) => representative.full_name.clone(),
                None => continue,
            };
            let current = self.value_of(&representative)?;
            self.set_value_inner(&representative, current, true, realtime)?;
        }
        Ok(())
    }

    /// Resets one modifier to its default and returns the previous value.
    ///
    /// Resetting any ethnic modifier restores the whole triple to its
    /// defaults atomically, with renormalization suspended for the duration
    /// so intermediate states never renormalize.
    pub fn reset_value(&mut self, full_name: &str) -> EngineResult<f64> {
        let (is_ethnic, default) = {
            let modifier = self
                .modifiers
                .get(full_name)
                .ok_or_else(|| EngineError::UnknownModifier(full_name.to_string()))?;
            (
                matches!(modifier.kind, ModifierKind::Ethnic { .. }),
                modifier.default_value,
            )
        };
        let old = self.value_of(full_name)?;

        if is_ethnic {
            let siblings: Vec<(String, f64)> = self
                .modifiers
                .iter()
                .filter(|m| matches!(m.kind, ModifierKind::Ethnic { .. }))
                .map(|m| (m.full_name.clone(), m.default_value))
                .collect();
            let previously_blocked = self.factors.ethnic_updates_blocked();
            self.factors.block_ethnic_updates(true);
            let mut result = Ok(());
            for (name, sibling_default) in &siblings {
                result = result.and(self.set_value(name, *sibling_default));
            }
            self.factors.block_ethnic_updates(previously_blocked);
            result?;
        } else {
            self.set_value(full_name, default)?;
        }
        Ok(old)
    }

    /// Resets every modifier to its default value. The ethnic triple resets
    /// atomically under suspended renormalization.
    pub fn reset(&mut self) -> EngineResult<()> {
        let mut ethnic: Vec<(String, f64)> = Vec::new();
        let mut plain: Vec<(String, f64)> = Vec::new();
        for modifier in self.modifiers.iter() {
            let entry = (modifier.full_name.clone(), modifier.default_value);
            if matches!(modifier.kind, ModifierKind::Ethnic { .. }) {
                ethnic.push(entry);
            } else {
                plain.push(entry);
            }
        }

        self.factors.block_ethnic_updates(true);
        let mut ethnic_result = Ok(());
        for (name, default) in &ethnic {
            ethnic_result = ethnic_result.and(self.set_value(name, *default));
        }
        self.factors.block_ethnic_updates(false);
        ethnic_result?;

        for (name, default) in &plain {
            self.set_value(name, *default)?;
        }
        Ok(())
    }

    /// Exports the current value of every modifier.
    pub fn export_config(&self) -> CharacterConfig {
        self.modifiers
            .iter()
            .map(|m| {
                let value = match &m.kind {
                    ModifierKind::Universal { .. } => m.stored_value(&self.values),
                    ModifierKind::Macro { field } => self.factors.field(*field),
                    ModifierKind::Ethnic { tag } => self.factors.ethnic(*tag),
                };
                (m.full_name.clone(), value)
            })
            .collect()
    }

    /// Imports a configuration: resets all modifiers to defaults, then
    /// applies the given values.
    ///
    /// Unknown modifier names are rejected before any state changes. The
    /// ethnic triple is applied as one batch under suspended
    /// renormalization, then renormalized once, so import order can never
    /// produce intermediate renormalization artifacts.
    pub fn import_config(&mut self, config: &CharacterConfig) -> EngineResult<()> {
        // Validate and partition before any state changes.
        let mut ethnic: Vec<(String, f64)> = Vec::new();
        let mut plain: Vec<(String, f64)> = Vec::new();
        for (name, value) in config.iter() {
            let modifier = self
                .modifiers
                .get(name)
                .ok_or_else(|| EngineError::UnknownModifier(name.to_string()))?;
            if matches!(modifier.kind, ModifierKind::Ethnic { .. }) {
                ethnic.push((name.to_string(), value));
            } else {
                plain.push((name.to_string(), value));
            }
        }

        self.reset()?;

        if !ethnic.is_empty() {
            self.factors.block_ethnic_updates(true);
            let mut batch_result = Ok(());
            for (name, value) in &ethnic {
                batch_result = batch_result.and(self.set_value(name, *value));
            }
            self.factors.block_ethnic_updates(false);
            batch_result?;

            // One renormalization pass keyed on the last applied leg, then
            // rewrite the triple's weights from the normalized values.
            if let Some(modifier) = ethnic
                .last()
                .and_then(|(last_name, _)| self.modifiers.get(last_name))
            {
                if let ModifierKind::Ethnic { tag } = modifier.kind {
                    let current = self.factors.ethnic(tag);
                    self.factors.set_ethnic(tag, current);
                }
            }
            for (name, _) in &ethnic {
                let current = self.value_of(name)?;
                self.set_value_inner(name, current, true, false)?;
            }
        }

        for (name, value) in &plain {
            self.set_value(name, *value)?;
        }
        Ok(())
    }

    // ////////////
    // Blending  //
    // ////////////

    /// Attaches loaded displacement data and reference vertices. The data's
    /// target count must match the catalog.
    pub fn attach_target_data(
        &mut self,
        data: TargetData,
        reference: Vec<[f32; 3]>,
    ) -> EngineResult<()> {
        if data.n_targets() != self.catalog.len() {
            return Err(EngineError::DisplacementLength {
                actual: data.len(),
                targets: self.catalog.len(),
                vertices: data.n_vertices(),
            });
        }
        self.blend = Some(BlendEngine::new(data, reference)?);
        Ok(())
    }

    /// Readiness flag: true once displacement data is attached. Callers must
    /// not depend on blend results before this is true.
    pub fn blend_ready(&self) -> bool {
        self.blend.is_some()
    }

    /// Access to the blend engine, for throttle configuration.
    pub fn blend_mut(&mut self) -> Option<&mut BlendEngine> {
        self.blend.as_mut()
    }

    /// Recomputes final vertex positions from the current target weights.
    /// Subject to the engine's throttle and unchanged-weights short circuit.
    pub fn bake(&mut self) -> EngineResult<BakeOutcome> {
        let blend = self.blend.as_mut().ok_or(EngineError::TargetsNotLoaded)?;
        blend.apply_targets(&self.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factors::EthnicTag;
    use crate::test_fixtures::{fixture_catalog, fixture_library};
    use pretty_assertions::assert_eq;

    const EPS: f64 = 1e-6;

    fn character() -> Character {
        let (character, report) =
            Character::new(Arc::new(fixture_catalog()), &fixture_library());
        assert!(report.is_clean(), "issues: {:?}", report.issues);
        character
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < EPS, "{} != {}", a, b);
    }

    #[test]
    fn test_initial_state_is_consistent() {
        let character = character();
        // Macro modifiers read their factor defaults.
        assert_close(character.value_of("macrodetails/Age").unwrap(), 0.5);
        assert_close(
            character.value_of("macrodetails/African").unwrap(),
            1.0 / 3.0,
        );
        // Macro group weights are initialized: with default factors the
        // young/average combinations carry weight.
        let catalog = character.catalog();
        let slot = catalog
            .slot("data/targets/macrodetails/caucasian-female-young.target")
            .unwrap();
        assert_close(character.target_values()[slot] as f64, 1.0 / 6.0);
    }

    #[test]
    fn test_universal_round_trip() {
        let mut character = character();
        for value in [-1.0, -0.5, -0.1, 0.0, 0.3, 0.7, 1.0] {
            character
                .set_value("breast/breast-trans-vert-down|up", value)
                .unwrap();
            let read = character
                .value_of("breast/breast-trans-vert-down|up")
                .unwrap();
            assert!((read - value).abs() < 1e-4, "{} != {}", read, value);
        }
    }

    #[test]
    fn test_macro_round_trip() {
        let mut character = character();
        character.set_value("macrodetails/Age", 0.21).unwrap();
        assert_close(character.value_of("macrodetails/Age").unwrap(), 0.21);
        assert_close(character.factors().age(), 0.21);
    }

    #[test]
    fn test_set_value_clamps() {
        let mut character = character();
        character.set_value("macrodetails/Age", 7.0).unwrap();
        assert_close(character.value_of("macrodetails/Age").unwrap(), 1.0);
        character
            .set_value("breast/breast-trans-vert-down|up", -4.0)
            .unwrap();
        assert_close(
            character
                .value_of("breast/breast-trans-vert-down|up")
                .unwrap(),
            -1.0,
        );
    }

    #[test]
    fn test_set_value_rejects_bad_input() {
        let mut character = character();
        assert!(matches!(
            character.set_value("macrodetails/Age", f64::NAN),
            Err(EngineError::NonFiniteValue { .. })
        ));
        assert!(matches!(
            character.set_value("no/such-modifier", 0.5),
            Err(EngineError::UnknownModifier(_))
        ));
    }

    #[test]
    fn test_weight_change_propagates_to_dependent_groups() {
        let mut character = character();
        let catalog = character.catalog();
        // A height target tagged averageweight: its weight must change when
        // the weight macro moves off center.
        let height_slot = catalog
            .slot(
                "data/targets/macrodetails/height/female-young-averagemuscle-averageweight-maxheight.target",
            )
            .unwrap();
        character
            .set_value("macrodetails-height/Height", 1.0)
            .unwrap();
        let before = character.target_values()[height_slot];
        assert!(before > 0.0);

        character
            .set_value("macrodetails-universal/Weight", 1.0)
            .unwrap();
        let after = character.target_values()[height_slot];
        // averageweight component went from 1 to 0.
        assert!(after.abs() < 1e-6);
        assert_ne!(before, after);
    }

    #[test]
    fn test_unrelated_targets_untouched_by_propagation() {
        let mut character = character();
        let catalog = character.catalog();
        let stomach_slot = catalog
            .slot("data/targets/stomach/stomach-pregnant-incr.target")
            .unwrap();
        character
            .set_value("stomach/stomach-pregnant-decr|incr", 0.4)
            .unwrap();
        let before = character.target_values()[stomach_slot];

        character.set_value("macrodetails-universal/Weight", 0.9).unwrap();
        let after = character.target_values()[stomach_slot];
        assert_eq!(before, after);
    }

    #[test]
    fn test_ethnic_set_renormalizes_triple() {
        let mut character = character();
        character.set_value("macrodetails/African", 0.8).unwrap();
        let factors = character.factors();
        let sum = factors.ethnic(EthnicTag::African)
            + factors.ethnic(EthnicTag::Asian)
            + factors.ethnic(EthnicTag::Caucasian);
        assert_close(sum, 1.0);
        assert_close(factors.ethnic(EthnicTag::African), 0.8);
        assert_close(factors.ethnic(EthnicTag::Asian), 0.1);
    }

    #[test]
    fn test_update_value_filters_propagation_to_realtime_groups() {
        let mut character = character();
        let catalog = character.catalog();
        // A breast group target keyed on averageweight, and a universal
        // group target keyed on maxweight.
        let breast_slot = catalog
            .slot(
                "data/targets/breast/female-young-averagemuscle-averageweight-maxcup-averagefirmness.target",
            )
            .unwrap();
        let universal_slot = catalog
            .slot(
                "data/targets/macrodetails/universal-female-young-averagemuscle-maxweight.target",
            )
            .unwrap();

        character.set_value("breast/BreastSize", 1.0).unwrap();
        let breast_before = character.target_values()[breast_slot];
        assert!(breast_before > 0.0);

        // Realtime updates refresh the interactive macro groups only: the
        // weight modifier's own group follows immediately, but the breast
        // group keeps its stale averageweight factor until a full
        // set_value.
        character
            .update_value("macrodetails-universal/Weight", 1.0)
            .unwrap();
        assert!(character.target_values()[universal_slot] > 0.0);
        assert_eq!(character.target_values()[breast_slot], breast_before);

        character
            .set_value("macrodetails-universal/Weight", 1.0)
            .unwrap();
        assert!(character.target_values()[breast_slot].abs() < 1e-6);
    }

    #[test]
    fn test_reset_value_returns_old_value() {
        let mut character = character();
        character
            .set_value("breast/breast-trans-vert-down|up", 0.7)
            .unwrap();
        let old = character
            .reset_value("breast/breast-trans-vert-down|up")
            .unwrap();
        assert!((old - 0.7).abs() < 1e-4);
        assert_close(
            character
                .value_of("breast/breast-trans-vert-down|up")
                .unwrap(),
            0.0,
        );
    }

    #[test]
    fn test_reset_value_on_ethnic_restores_whole_triple() {
        let mut character = character();
        character.set_value("macrodetails/African", 0.9).unwrap();
        character.set_value("macrodetails/Asian", 0.05).unwrap();

        character.reset_value("macrodetails/Caucasian").unwrap();

        let factors = character.factors();
        assert!(!factors.ethnic_updates_blocked());
        for tag in [EthnicTag::African, EthnicTag::Asian, EthnicTag::Caucasian] {
            assert_close(factors.ethnic(tag), 1.0 / 3.0);
        }
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut character = character();
        character.set_value("macrodetails/Age", 0.9).unwrap();
        character.set_value("macrodetails/African", 0.7).unwrap();
        character
            .set_value("breast/breast-trans-vert-down|up", -0.6)
            .unwrap();

        character.reset().unwrap();

        for modifier in character.modifiers().iter() {
            let value = character.value_of(&modifier.full_name).unwrap();
            assert!(
                (value - modifier.default_value).abs() < EPS,
                "{} = {} != {}",
                modifier.full_name,
                value,
                modifier.default_value
            );
        }
        let factors = character.factors();
        assert!(!factors.ethnic_updates_blocked());
        assert_close(factors.ethnic(EthnicTag::African), 1.0 / 3.0);
    }

    #[test]
    fn test_export_import_round_trip() {
        let mut subject = character();
        subject.set_value("macrodetails/Age", 0.8).unwrap();
        subject.set_value("macrodetails/Asian", 0.6).unwrap();
        subject
            .set_value("armslegs/r-upperarm-fat-decr|incr", -0.35)
            .unwrap();
        let exported = subject.export_config();

        let mut restored = character();
        restored.import_config(&exported).unwrap();
        let round_tripped = restored.export_config();

        for (name, value) in exported.iter() {
            let restored_value = round_tripped.get(name).unwrap();
            assert!(
                (restored_value - value).abs() < EPS,
                "{}: {} != {}",
                name,
                restored_value,
                value
            );
        }
    }

    #[test]
    fn test_import_restores_ethnic_triple_exactly() {
        let mut subject = character();
        subject.set_value("macrodetails/African", 0.6).unwrap();
        subject.set_value("macrodetails/Asian", 0.3).unwrap();
        let exported = subject.export_config();
        let triple_sum = exported.get("macrodetails/African").unwrap()
            + exported.get("macrodetails/Asian").unwrap()
            + exported.get("macrodetails/Caucasian").unwrap();
        assert_close(triple_sum, 1.0);

        let mut restored = character();
        restored.import_config(&exported).unwrap();
        for tag in ["African", "Asian", "Caucasian"] {
            let name = format!("macrodetails/{}", tag);
            assert_close(
                restored.value_of(&name).unwrap(),
                exported.get(&name).unwrap(),
            );
        }
    }

    #[test]
    fn test_import_rejects_unknown_names_without_mutation() {
        let mut character = character();
        character.set_value("macrodetails/Age", 0.9).unwrap();

        let mut config = CharacterConfig::new();
        config.set("no/such-modifier", 0.5);
        assert!(matches!(
            character.import_config(&config),
            Err(EngineError::UnknownModifier(_))
        ));
        // State untouched by the rejected import.
        assert_close(character.value_of("macrodetails/Age").unwrap(), 0.9);
    }

    #[test]
    fn test_blend_not_ready() {
        let mut character = character();
        assert!(!character.blend_ready());
        assert!(matches!(
            character.bake(),
            Err(EngineError::TargetsNotLoaded)
        ));
    }
}
