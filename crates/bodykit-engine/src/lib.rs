//! bodykit Runtime Engine
//!
//! This crate implements the morphing runtime for bodykit: macro factors,
//! the modifier dependency graph, randomized character generation, and the
//! target blend engine that folds weighted displacement fields into final
//! mesh vertex positions.
//!
//! # Overview
//!
//! A [`Character`] owns all mutable state of one avatar: one [`Factors`]
//! (the eleven macro scalars and their derived component weights), one
//! [`ModifierSet`] (every slider plus the macro dependency graph), the dense
//! per-target weight array, and optionally the attached displacement data.
//!
//! Setting a modifier value runs to completion synchronously: the value is
//! validated and clamped, macro values write through to their factor, target
//! weights are recomputed and stored, and dependent modifier groups are
//! refreshed with further propagation suppressed. Blending is a separate,
//! throttled pass over the stored weights.
//!
//! # Determinism
//!
//! Randomized generation uses PCG32 behind [`DeterministicRng`]; a given
//! seed always produces the same character.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use bodykit_engine::Character;
//! use bodykit_spec::{ModifierLibrary, TargetCatalog};
//!
//! let catalog = Arc::new(TargetCatalog::from_paths([
//!     "data/targets/macrodetails/caucasian-female-young.target",
//!     "data/targets/macrodetails/caucasian-male-old.target",
//! ]));
//! let library = ModifierLibrary::from_json(
//!     r#"[{"group": "macrodetails", "modifiers": [{"macrovar": "Age"}, {"macrovar": "Gender"}]}]"#,
//! ).unwrap();
//!
//! let (mut character, report) = Character::new(catalog, &library);
//! assert!(report.is_clean());
//!
//! character.set_value("macrodetails/Age", 0.25).unwrap();
//! assert!((character.value_of("macrodetails/Age").unwrap() - 0.25).abs() < 1e-9);
//! ```
//!
//! # Crate Structure
//!
//! - [`character`] - The character aggregate and its update flow
//! - [`factors`] - Macro scalar storage and component weight derivation
//! - [`graph`] - The modifier set and macro dependency graph
//! - [`modifier`] - Runtime modifiers and target weight computation
//! - [`random`] - Randomized character generation
//! - [`blend`] - The throttled target blend engine
//! - [`skin`] - Ethnic skin tone blending
//! - [`rng`] - Deterministic RNG with seed expansion

pub mod blend;
pub mod character;
pub mod error;
pub mod factors;
pub mod graph;
pub mod modifier;
pub mod random;
pub mod rng;
pub mod skin;

// Re-export main types at crate root
pub use blend::{
    BakeOutcome, BlendEngine, SkipReason, TargetData, DEFAULT_MIN_UPDATE_INTERVAL,
    DISPLACEMENT_SCALE,
};
pub use character::Character;
pub use error::{EngineError, EngineResult};
pub use factors::{
    EthnicTag, Factors, Gender, MacroField, MAX_AGE_YEARS, MAX_BMI, MID_AGE_YEARS, MIN_AGE_YEARS,
    MIN_BMI,
};
pub use graph::{GraphIssue, GraphReport, ModifierSet, REALTIME_GROUPS};
pub use modifier::{Modifier, ModifierKind, TargetWeights};
pub use random::RandomizeOptions;
pub use rng::DeterministicRng;
pub use skin::EthnicSkinBlender;

/// Shared library/catalog fixtures shaped like a production target set.
#[cfg(test)]
pub(crate) mod test_fixtures {
    use bodykit_spec::{ModifierLibrary, TargetCatalog};

    const RACES: [&str; 3] = ["african", "asian", "caucasian"];
    const GENDERS: [&str; 2] = ["female", "male"];
    const AGES: [&str; 4] = ["baby", "child", "young", "old"];
    const ADULT_AGES: [&str; 2] = ["young", "old"];
    const MUSCLES: [&str; 3] = ["minmuscle", "averagemuscle", "maxmuscle"];
    const WEIGHTS: [&str; 3] = ["minweight", "averageweight", "maxweight"];
    const HEIGHTS: [&str; 3] = ["minheight", "averageheight", "maxheight"];
    const CUPS: [&str; 3] = ["mincup", "averagecup", "maxcup"];
    const FIRMNESS: [&str; 3] = ["minfirmness", "averagefirmness", "maxfirmness"];
    const PROPORTIONS: [&str; 3] = [
        "uncommonproportions",
        "regularproportions",
        "idealproportions",
    ];

    fn cartesian(dir: &str, parts: &[&[&str]]) -> Vec<String> {
        let mut combos = vec![String::new()];
        for part in parts {
            let mut next = Vec::with_capacity(combos.len() * part.len());
            for prefix in &combos {
                for token in *part {
                    if prefix.is_empty() {
                        next.push((*token).to_string());
                    } else {
                        next.push(format!("{}-{}", prefix, token));
                    }
                }
            }
            combos = next;
        }
        combos
            .into_iter()
            .map(|combo| format!("data/targets/{}/{}.target", dir, combo))
            .collect()
    }

    /// 128 targets over the macro groups plus a few region sliders.
    pub(crate) fn fixture_catalog() -> TargetCatalog {
        let mut paths: Vec<String> = Vec::new();
        paths.extend(cartesian("macrodetails", &[&RACES, &GENDERS, &AGES]));
        paths.extend(cartesian(
            "macrodetails",
            &[&["universal"], &GENDERS, &ADULT_AGES, &MUSCLES, &WEIGHTS],
        ));
        paths.extend(cartesian(
            "macrodetails/height",
            &[
                &GENDERS,
                &ADULT_AGES,
                &["averagemuscle"],
                &["averageweight"],
                &HEIGHTS,
            ],
        ));
        paths.extend(cartesian(
            "macrodetails/proportions",
            &[
                &GENDERS,
                &ADULT_AGES,
                &["averagemuscle"],
                &["averageweight"],
                &PROPORTIONS,
            ],
        ));
        paths.extend(cartesian(
            "breast",
            &[
                &GENDERS,
                &ADULT_AGES,
                &["averagemuscle"],
                &["averageweight"],
                &CUPS,
                &FIRMNESS,
            ],
        ));
        paths.extend(cartesian("breast", &[&["breast-trans-vert"], &["down", "up"]]));
        paths.extend(cartesian("stomach", &[&["stomach-pregnant"], &["decr", "incr"]]));
        paths.extend(cartesian(
            "armslegs",
            &[&["r", "l"], &["upperarm"], &["fat"], &["decr", "incr"]],
        ));
        TargetCatalog::from_paths(paths)
    }

    /// The modifier groups driving the fixture catalog.
    pub(crate) fn fixture_library() -> ModifierLibrary {
        ModifierLibrary::from_json(
            r#"[
                {"group": "macrodetails", "modifiers": [
                    {"macrovar": "Gender"},
                    {"macrovar": "Age"},
                    {"macrovar": "African", "modifierType": "EthnicModifier"},
                    {"macrovar": "Asian", "modifierType": "EthnicModifier"},
                    {"macrovar": "Caucasian", "modifierType": "EthnicModifier"}
                ]},
                {"group": "macrodetails-universal", "modifiers": [
                    {"macrovar": "Muscle"},
                    {"macrovar": "Weight"}
                ]},
                {"group": "macrodetails-height", "modifiers": [
                    {"macrovar": "Height"}
                ]},
                {"group": "macrodetails-proportions", "modifiers": [
                    {"macrovar": "BodyProportions"}
                ]},
                {"group": "breast", "modifiers": [
                    {"macrovar": "BreastSize"},
                    {"macrovar": "BreastFirmness"},
                    {"target": "breast-trans-vert", "min": "down", "max": "up"}
                ]},
                {"group": "stomach", "modifiers": [
                    {"target": "stomach-pregnant", "min": "decr", "max": "incr"}
                ]},
                {"group": "armslegs", "modifiers": [
                    {"target": "r-upperarm-fat", "min": "decr", "max": "incr"},
                    {"target": "l-upperarm-fat", "min": "decr", "max": "incr"}
                ]}
            ]"#,
        )
        .expect("fixture library parses")
    }
}
