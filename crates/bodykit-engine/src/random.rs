//! Randomized character generation.
//!
//! Each modifier family gets the distribution that looks right for it:
//! uniform for age and the ethnic triple (a character could be anything),
//! bimodal for gender (most people are mostly male or mostly female), narrow
//! normals for face sliders, wider normals for the remaining macro sliders,
//! and a reflect-at-bounds normal everywhere else. Symmetric left/right
//! pairs are sampled jointly so faces stay plausible at high symmetry.

use bodykit_spec::CharacterConfig;

use crate::character::Character;
use crate::error::EngineResult;
use crate::rng::DeterministicRng;

/// Macro slider groups.
const MACRO_GROUPS: [&str; 3] = [
    "macrodetails",
    "macrodetails-universal",
    "macrodetails-proportions",
];
/// Measurement slider groups.
const MEASURE_GROUPS: [&str; 1] = ["measure"];
/// Height slider groups.
const HEIGHT_GROUPS: [&str; 1] = ["macrodetails-height"];
/// Face region groups.
const FACE_GROUPS: [&str; 10] = [
    "eyebrows", "eyes", "chin", "forehead", "head", "mouth", "nose", "neck", "ears", "cheek",
];
/// Body region groups.
const BODY_GROUPS: [&str; 9] = [
    "pelvis", "hip", "armslegs", "stomach", "breast", "buttocks", "torso", "legs", "genitals",
];

/// Face groups sampled with a narrow deviation.
const NARROW_FACE_GROUPS: [&str; 9] = [
    "forehead", "eyebrows", "neck", "eyes", "nose", "ears", "chin", "cheek", "mouth",
];
/// Sliders sampled with a very narrow deviation.
const VERY_NARROW_MODIFIERS: [&str; 2] = [
    "forehead/forehead-nubian-less|more",
    "forehead/forehead-scale-vert-less|more",
];
/// Macro sliders sampled uniformly.
const UNIFORM_MACRO_MODIFIERS: [&str; 4] = [
    "macrodetails/Age",
    "macrodetails/African",
    "macrodetails/Asian",
    "macrodetails/Caucasian",
];

const GENDER_MODIFIER: &str = "macrodetails/Gender";
const AGE_MODIFIER: &str = "macrodetails/Age";
const PREGNANT_MODIFIER: &str = "stomach/stomach-pregnant-decr|incr";

/// Fertile age window (normalized) outside which pregnancy targets zero.
const FERTILE_AGE_RANGE: std::ops::RangeInclusive<f64> = 0.2..=0.75;

/// Options for [`Character::random_values`].
#[derive(Debug, Clone)]
pub struct RandomizeOptions {
    /// Amount of left/right symmetry preserved, 0 to 1.
    pub symmetry: f64,
    /// Randomize macro sliders.
    pub macro_sliders: bool,
    /// Randomize height.
    pub height: bool,
    /// Randomize face regions.
    pub face: bool,
    /// Randomize body regions.
    pub body: bool,
    /// Randomize measurement sliders.
    pub measure: bool,
    /// Round sampled values to this many decimal places.
    pub rounding: Option<u32>,
    /// Multiplier on every deviation, for wilder or tamer characters.
    pub sigma_multiple: f64,
}

impl Default for RandomizeOptions {
    fn default() -> Self {
        Self {
            symmetry: 1.0,
            macro_sliders: true,
            height: false,
            face: true,
            body: true,
            measure: false,
            rounding: Some(2),
            sigma_multiple: 1.0,
        }
    }
}

fn round_to(value: f64, rounding: Option<u32>) -> f64 {
    match rounding {
        Some(decimals) => {
            let factor = 10f64.powi(decimals as i32);
            (value * factor).round() / factor
        }
        None => value,
    }
}

impl Character {
    /// Samples a full random configuration without applying it.
    pub fn random_values(
        &self,
        options: &RandomizeOptions,
        rng: &mut DeterministicRng,
    ) -> CharacterConfig {
        let mut groups: Vec<&str> = Vec::new();
        if options.macro_sliders {
            groups.extend(MACRO_GROUPS);
        }
        if options.measure {
            groups.extend(MEASURE_GROUPS);
        }
        if options.height {
            groups.extend(HEIGHT_GROUPS);
        }
        if options.face {
            groups.extend(FACE_GROUPS);
        }
        if options.body {
            groups.extend(BODY_GROUPS);
        }

        let mut names: Vec<String> = groups
            .iter()
            .flat_map(|group| self.modifiers().by_group(group))
            .map(|m| m.full_name.clone())
            .collect();
        // Vary the order so dependent sliders (the ethnic triple above all)
        // do not always renormalize in the same sequence.
        rng.shuffle(&mut names);

        let mut config = CharacterConfig::new();

        for name in &names {
            if config.get(name).is_some() {
                continue;
            }
            let modifier = match self.modifiers().get(name) {
                Some(modifier) => modifier,
                None => continue,
            };

            let mut sigma: Option<f64> = None;
            let mut value: Option<f64> = None;

            if modifier.group == "head" {
                sigma = Some(0.1 * options.sigma_multiple);
            } else if VERY_NARROW_MODIFIERS.contains(&name.as_str()) {
                sigma = Some(0.02 * options.sigma_multiple);
            } else if name.contains("trans-horiz") || name == "hip/hip-trans-in|out" {
                // Horizontal translations break symmetry; pin them at full
                // symmetry, sample a window around the default otherwise.
                if options.symmetry == 1.0 {
                    value = Some(modifier.default_value);
                } else {
                    let window = (modifier.max - modifier.min).abs() * (1.0 - options.symmetry);
                    let lo = modifier.min.max(modifier.default_value - window / 2.0);
                    let hi = modifier.max.min(modifier.default_value + window / 2.0);
                    value = Some(rng.gen_reflected_normal(lo, hi, modifier.default_value, 0.1));
                }
            } else if NARROW_FACE_GROUPS.contains(&modifier.group.as_str()) {
                sigma = Some(0.1 * options.sigma_multiple);
            } else if modifier.group == "macrodetails" {
                if UNIFORM_MACRO_MODIFIERS.contains(&name.as_str()) {
                    value = Some(rng.gen_f64());
                } else if name == GENDER_MODIFIER {
                    let center = if rng.gen_f64() > 0.5 { 1.0 } else { 0.0 };
                    value = Some(rng.gen_reflected_normal(
                        modifier.min,
                        modifier.max,
                        center,
                        0.1,
                    ));
                } else {
                    sigma = Some(0.3 * options.sigma_multiple);
                }
            } else {
                sigma = Some(0.1 * options.sigma_multiple);
            }

            let sampled = match value {
                Some(value) => value,
                None => rng.gen_reflected_normal(
                    modifier.min,
                    modifier.max,
                    modifier.default_value,
                    sigma.unwrap_or(0.1 * options.sigma_multiple),
                ),
            };
            let sampled = round_to(sampled, options.rounding);
            config.set(name.clone(), sampled);

            // Sample the mirror jointly: identical at full symmetry, a
            // window around this value otherwise.
            let mirror_name = match modifier.mirrored_full_name() {
                Some(mirror_name) if config.get(&mirror_name).is_none() => mirror_name,
                _ => continue,
            };
            let mirror = match self.modifiers().get(&mirror_name) {
                Some(mirror) => mirror,
                None => continue,
            };
            let mirror_value = if options.symmetry == 1.0 {
                sampled
            } else {
                let deviation = (1.0 - options.symmetry) * (mirror.max - mirror.min).abs() / 2.0;
                let lo = mirror.min.max((sampled - deviation).min(mirror.max));
                let hi = mirror.min.max((sampled + deviation).min(mirror.max));
                rng.gen_reflected_normal(
                    lo,
                    hi,
                    sampled,
                    sigma.unwrap_or(0.1 * options.sigma_multiple),
                )
            };
            config.set(mirror_name, round_to(mirror_value, options.rounding));
        }

        // No pregnancy for male subjects or ages outside the fertile range.
        let male = config
            .get(GENDER_MODIFIER)
            .map(|v| v > 0.5)
            .unwrap_or(false);
        let age_outside = config
            .get(AGE_MODIFIER)
            .map(|age| !FERTILE_AGE_RANGE.contains(&age))
            .unwrap_or(false);
        if (male || age_outside) && config.get(PREGNANT_MODIFIER).is_some() {
            config.set(PREGNANT_MODIFIER, 0.0);
        }

        config
    }

    /// Samples a random configuration and applies it.
    pub fn randomize(
        &mut self,
        options: &RandomizeOptions,
        rng: &mut DeterministicRng,
    ) -> EngineResult<CharacterConfig> {
        let config = self.random_values(options, rng);
        for (name, value) in config.iter() {
            self.set_value_inner(name, value, true, false)?;
        }
        Ok(config)
    }
}
