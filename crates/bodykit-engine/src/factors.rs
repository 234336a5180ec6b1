//! Macro factor storage and derived component weights.
//!
//! `Factors` holds the eleven normalized scalars that describe a character's
//! macro shape: eight independent axes plus the ethnic triple. Every scalar
//! carries a small set of derived component weights (`baby`/`child`/`young`/
//! `old` for age, `minweight`/`averageweight`/`maxweight` for weight, ...)
//! that target weighting consumes by tag name. The derived weights of one
//! axis always sum to 1.

use bodykit_spec::MacroCategory;

use crate::error::{EngineError, EngineResult};

/// Youngest representable age in years (normalized age 0).
pub const MIN_AGE_YEARS: f64 = 1.0;
/// Age in years at the normalized midpoint (0.5).
pub const MID_AGE_YEARS: f64 = 25.0;
/// Oldest representable age in years (normalized age 1).
pub const MAX_AGE_YEARS: f64 = 90.0;

/// BMI corresponding to weight 0.
pub const MIN_BMI: f64 = 15.0;
/// BMI corresponding to weight 1.
pub const MAX_BMI: f64 = 35.0;

/// Normalized age of a ten year old; the baby/child breakpoint anchor.
const CHILD_AGE: f64 = 0.1875;

/// Tolerance for the "one ethnicity is everything" normalization case.
const ETHNIC_EPSILON: f64 = 0.001;

/// The eight factor fields a macro modifier can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MacroField {
    /// Age, 0 (1 year) to 1 (90 years).
    Age,
    /// Gender, 0 (female) to 1 (male).
    Gender,
    /// Body weight.
    Weight,
    /// Muscle mass.
    Muscle,
    /// Body height.
    Height,
    /// Breast size.
    BreastSize,
    /// Breast firmness.
    BreastFirmness,
    /// Body proportions, 0 (uncommon) to 1 (ideal).
    BodyProportions,
}

impl MacroField {
    /// Maps a macro category to the factor field it drives. `Race` is driven
    /// per tag through the ethnic triple, not through a single field.
    pub fn from_category(category: MacroCategory) -> Option<MacroField> {
        match category {
            MacroCategory::Age => Some(MacroField::Age),
            MacroCategory::Gender => Some(MacroField::Gender),
            MacroCategory::Weight => Some(MacroField::Weight),
            MacroCategory::Muscle => Some(MacroField::Muscle),
            MacroCategory::Height => Some(MacroField::Height),
            MacroCategory::BreastSize => Some(MacroField::BreastSize),
            MacroCategory::BreastFirmness => Some(MacroField::BreastFirmness),
            MacroCategory::BodyProportions => Some(MacroField::BodyProportions),
            MacroCategory::Race => None,
        }
    }
}

/// One leg of the ethnic triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EthnicTag {
    /// African blend weight.
    African,
    /// Asian blend weight.
    Asian,
    /// Caucasian blend weight.
    Caucasian,
}

impl EthnicTag {
    /// All three tags.
    pub fn all() -> [EthnicTag; 3] {
        [EthnicTag::African, EthnicTag::Asian, EthnicTag::Caucasian]
    }

    /// The tag name as it appears in target paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            EthnicTag::African => "african",
            EthnicTag::Asian => "asian",
            EthnicTag::Caucasian => "caucasian",
        }
    }

    /// Parses a tag name.
    pub fn from_tag(tag: &str) -> Option<EthnicTag> {
        match tag {
            "african" => Some(EthnicTag::African),
            "asian" => Some(EthnicTag::Asian),
            "caucasian" => Some(EthnicTag::Caucasian),
            _ => None,
        }
    }
}

/// Dominant gender of a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    /// Gender scalar below 0.5.
    Female,
    /// Gender scalar above 0.5.
    Male,
}

/// Derived age component weights.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct AgeComponents {
    baby: f64,
    child: f64,
    young: f64,
    old: f64,
}

/// Derived three-way split for a bipolar axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct Split3 {
    min: f64,
    average: f64,
    max: f64,
}

impl Split3 {
    /// Split where the average weight absorbs both extremes
    /// (`average = 1 - (max + min)`).
    fn balanced(value: f64) -> Self {
        let max = (value * 2.0 - 1.0).max(0.0);
        let min = (1.0 - value * 2.0).max(0.0);
        Self {
            min,
            average: 1.0 - (max + min),
            max,
        }
    }

    /// Split where the average weight only offsets the dominant extreme
    /// (`average = 1 - max(max, min)`). Height, breast and proportion axes
    /// use this form; do not unify with `balanced`.
    fn dominant(value: f64) -> Self {
        let max = (value * 2.0 - 1.0).max(0.0);
        let min = (1.0 - value * 2.0).max(0.0);
        Self {
            min,
            average: 1.0 - max.max(min),
            max,
        }
    }
}

/// Normalized macro attribute storage with derived component weights.
#[derive(Debug, Clone, PartialEq)]
pub struct Factors {
    age: f64,
    gender: f64,
    weight: f64,
    muscle: f64,
    height: f64,
    breast_size: f64,
    breast_firmness: f64,
    body_proportions: f64,

    african: f64,
    asian: f64,
    caucasian: f64,

    /// Suppresses ethnic renormalization during bulk updates.
    block_ethnic_updates: bool,

    age_components: AgeComponents,
    weight_split: Split3,
    muscle_split: Split3,
    height_split: Split3,
    cup_split: Split3,
    firmness_split: Split3,
    proportions_split: Split3,
}

impl Default for Factors {
    fn default() -> Self {
        let mut factors = Self {
            age: 0.5,
            gender: 0.5,
            weight: 0.5,
            muscle: 0.5,
            height: 0.5,
            breast_size: 0.5,
            breast_firmness: 0.5,
            body_proportions: 0.5,
            african: 1.0 / 3.0,
            asian: 1.0 / 3.0,
            caucasian: 1.0 / 3.0,
            block_ethnic_updates: false,
            age_components: AgeComponents::default(),
            weight_split: Split3::default(),
            muscle_split: Split3::default(),
            height_split: Split3::default(),
            cup_split: Split3::default(),
            firmness_split: Split3::default(),
            proportions_split: Split3::default(),
        };
        factors.recompute_all();
        factors
    }
}

impl Factors {
    /// Creates factors at their default midpoint values.
    pub fn new() -> Self {
        Self::default()
    }

    fn recompute_all(&mut self) {
        self.recompute_age();
        self.weight_split = Split3::balanced(self.weight);
        self.muscle_split = Split3::balanced(self.muscle);
        self.height_split = Split3::dominant(self.height);
        self.cup_split = Split3::dominant(self.breast_size);
        self.firmness_split = Split3::dominant(self.breast_firmness);
        self.proportions_split = Split3::dominant(self.body_proportions);
    }

    /// The a8 age convention: 0 is a 1 year old baby, 0.1875 a 10 year old
    /// child, 0.5 a 25 year old young adult, 1 a 90 year old.
    fn recompute_age(&mut self) {
        let a = self.age;
        if a < 0.5 {
            let baby_slope = 1.0 / CHILD_AGE;
            let young_slope = 1.0 / (0.5 - CHILD_AGE);
            let young = ((a - CHILD_AGE) * young_slope).max(0.0);
            self.age_components = AgeComponents {
                old: 0.0,
                baby: (1.0 - a * baby_slope).max(0.0),
                young,
                child: ((baby_slope * a).min(1.0) - young).max(0.0),
            };
        } else {
            let old = (a * 2.0 - 1.0).max(0.0);
            self.age_components = AgeComponents {
                baby: 0.0,
                child: 0.0,
                old,
                young: 1.0 - old,
            };
        }
    }

    // //////////////////
    // Field accessors //
    // //////////////////

    /// Age scalar in [0,1].
    pub fn age(&self) -> f64 {
        self.age
    }

    /// Gender scalar in [0,1]; 0 is female, 1 is male.
    pub fn gender(&self) -> f64 {
        self.gender
    }

    /// Weight scalar in [0,1].
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Muscle scalar in [0,1].
    pub fn muscle(&self) -> f64 {
        self.muscle
    }

    /// Height scalar in [0,1].
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Breast size scalar in [0,1].
    pub fn breast_size(&self) -> f64 {
        self.breast_size
    }

    /// Breast firmness scalar in [0,1].
    pub fn breast_firmness(&self) -> f64 {
        self.breast_firmness
    }

    /// Body proportions scalar in [0,1].
    pub fn body_proportions(&self) -> f64 {
        self.body_proportions
    }

    /// Sets the age scalar, clamped to [0,1].
    pub fn set_age(&mut self, age: f64) {
        let age = age.clamp(0.0, 1.0);
        if self.age == age {
            return;
        }
        self.age = age;
        self.recompute_age();
    }

    /// Sets the gender scalar, clamped to [0,1].
    pub fn set_gender(&mut self, gender: f64) {
        self.gender = gender.clamp(0.0, 1.0);
    }

    /// Sets the weight scalar, clamped to [0,1].
    pub fn set_weight(&mut self, weight: f64) {
        let weight = weight.clamp(0.0, 1.0);
        if self.weight == weight {
            return;
        }
        self.weight = weight;
        self.weight_split = Split3::balanced(weight);
    }

    /// Sets the muscle scalar, clamped to [0,1].
    pub fn set_muscle(&mut self, muscle: f64) {
        let muscle = muscle.clamp(0.0, 1.0);
        if self.muscle == muscle {
            return;
        }
        self.muscle = muscle;
        self.muscle_split = Split3::balanced(muscle);
    }

    /// Sets the height scalar, clamped to [0,1].
    pub fn set_height(&mut self, height: f64) {
        let height = height.clamp(0.0, 1.0);
        if self.height == height {
            return;
        }
        self.height = height;
        self.height_split = Split3::dominant(height);
    }

    /// Sets the breast size scalar, clamped to [0,1].
    pub fn set_breast_size(&mut self, size: f64) {
        let size = size.clamp(0.0, 1.0);
        if self.breast_size == size {
            return;
        }
        self.breast_size = size;
        self.cup_split = Split3::dominant(size);
    }

    /// Sets the breast firmness scalar, clamped to [0,1].
    pub fn set_breast_firmness(&mut self, firmness: f64) {
        let firmness = firmness.clamp(0.0, 1.0);
        if self.breast_firmness == firmness {
            return;
        }
        self.breast_firmness = firmness;
        self.firmness_split = Split3::dominant(firmness);
    }

    /// Sets the body proportions scalar, clamped to [0,1].
    pub fn set_body_proportions(&mut self, proportions: f64) {
        let proportions = proportions.clamp(0.0, 1.0);
        if self.body_proportions == proportions {
            return;
        }
        self.body_proportions = proportions;
        self.proportions_split = Split3::dominant(proportions);
    }

    /// Reads a field by enum.
    pub fn field(&self, field: MacroField) -> f64 {
        match field {
            MacroField::Age => self.age,
            MacroField::Gender => self.gender,
            MacroField::Weight => self.weight,
            MacroField::Muscle => self.muscle,
            MacroField::Height => self.height,
            MacroField::BreastSize => self.breast_size,
            MacroField::BreastFirmness => self.breast_firmness,
            MacroField::BodyProportions => self.body_proportions,
        }
    }

    /// Writes a field by enum.
    pub fn set_field(&mut self, field: MacroField, value: f64) {
        match field {
            MacroField::Age => self.set_age(value),
            MacroField::Gender => self.set_gender(value),
            MacroField::Weight => self.set_weight(value),
            MacroField::Muscle => self.set_muscle(value),
            MacroField::Height => self.set_height(value),
            MacroField::BreastSize => self.set_breast_size(value),
            MacroField::BreastFirmness => self.set_breast_firmness(value),
            MacroField::BodyProportions => self.set_body_proportions(value),
        }
    }

    // ///////////
    // Ethnics  //
    // ///////////

    /// Reads one leg of the ethnic triple.
    pub fn ethnic(&self, tag: EthnicTag) -> f64 {
        match tag {
            EthnicTag::African => self.african,
            EthnicTag::Asian => self.asian,
            EthnicTag::Caucasian => self.caucasian,
        }
    }

    fn set_ethnic_raw(&mut self, tag: EthnicTag, value: f64) {
        match tag {
            EthnicTag::African => self.african = value,
            EthnicTag::Asian => self.asian = value,
            EthnicTag::Caucasian => self.caucasian = value,
        }
    }

    /// Sets one leg of the ethnic triple, clamped to [0,1]. Unless updates
    /// are blocked, the other two legs are rescaled so the triple sums to 1
    /// while preserving their mutual ratio.
    pub fn set_ethnic(&mut self, tag: EthnicTag, value: f64) {
        self.set_ethnic_raw(tag, value.clamp(0.0, 1.0));
        if !self.block_ethnic_updates {
            self.normalize_ethnics(tag);
        }
    }

    /// Whether ethnic renormalization is currently suppressed.
    pub fn ethnic_updates_blocked(&self) -> bool {
        self.block_ethnic_updates
    }

    /// Suppresses or restores ethnic renormalization. Bulk updates (reset,
    /// config import) set this for the duration so intermediate states are
    /// never normalized.
    pub fn block_ethnic_updates(&mut self, block: bool) {
        self.block_ethnic_updates = block;
    }

    /// Rescales the two legs other than `exclude` so the triple sums to 1,
    /// preserving their mutual ratio. Degenerate states resolve in priority
    /// order: all-zero resets to thirds; a lone ~1 leg zeroes the others; a
    /// zero pair under a fractional leg is seeded to 0.01 and rescaled on
    /// the second pass.
    fn normalize_ethnics(&mut self, exclude: EthnicTag) {
        let others: Vec<EthnicTag> = EthnicTag::all()
            .into_iter()
            .filter(|t| *t != exclude)
            .collect();

        // Two passes at most: the seeding branch always converges next pass.
        for _ in 0..2 {
            let excluded = self.ethnic(exclude);
            let other_total: f64 = others.iter().map(|t| self.ethnic(*t)).sum();

            if other_total == 0.0 {
                if excluded == 0.0 {
                    for tag in EthnicTag::all() {
                        self.set_ethnic_raw(tag, 1.0 / 3.0);
                    }
                    return;
                } else if (excluded - 1.0).abs() <= ETHNIC_EPSILON {
                    for tag in &others {
                        self.set_ethnic_raw(*tag, 0.0);
                    }
                    self.set_ethnic_raw(exclude, 1.0);
                    return;
                } else {
                    for tag in &others {
                        self.set_ethnic_raw(*tag, 0.01);
                    }
                    continue;
                }
            }

            let remaining = 1.0 - excluded;
            for tag in &others {
                let value = self.ethnic(*tag);
                self.set_ethnic_raw(*tag, remaining * (value / other_total));
            }
            return;
        }
    }

    /// Most dominant ethnicity, or `None` when no leg is strictly greater
    /// than both others.
    pub fn ethnicity(&self) -> Option<EthnicTag> {
        if self.asian > self.african && self.asian > self.caucasian {
            Some(EthnicTag::Asian)
        } else if self.african > self.asian && self.african > self.caucasian {
            Some(EthnicTag::African)
        } else if self.caucasian > self.asian && self.caucasian > self.african {
            Some(EthnicTag::Caucasian)
        } else {
            None
        }
    }

    /// Dominant gender, or `None` at the exact midpoint.
    pub fn dominant_gender(&self) -> Option<Gender> {
        if self.gender < 0.5 {
            Some(Gender::Female)
        } else if self.gender > 0.5 {
            Some(Gender::Male)
        } else {
            None
        }
    }

    // ////////////////
    // Unit mappings //
    // ////////////////

    /// Approximate age in years for the current age scalar.
    pub fn age_years(&self) -> f64 {
        if self.age < 0.5 {
            MIN_AGE_YEARS + (MID_AGE_YEARS - MIN_AGE_YEARS) * 2.0 * self.age
        } else {
            MID_AGE_YEARS + (MAX_AGE_YEARS - MID_AGE_YEARS) * 2.0 * (self.age - 0.5)
        }
    }

    /// Sets the age scalar from years; years outside [1, 90] are rejected.
    pub fn set_age_years(&mut self, years: f64) -> EngineResult<()> {
        if !(MIN_AGE_YEARS..=MAX_AGE_YEARS).contains(&years) {
            return Err(EngineError::AgeOutOfRange {
                years,
                min: MIN_AGE_YEARS,
                max: MAX_AGE_YEARS,
            });
        }
        let age = if years < MID_AGE_YEARS {
            (years - MIN_AGE_YEARS) / ((MID_AGE_YEARS - MIN_AGE_YEARS) * 2.0)
        } else {
            (years - MID_AGE_YEARS) / ((MAX_AGE_YEARS - MID_AGE_YEARS) * 2.0) + 0.5
        };
        self.set_age(age);
        Ok(())
    }

    /// Approximate BMI for the current weight scalar.
    pub fn weight_bmi(&self) -> f64 {
        self.weight * (MAX_BMI - MIN_BMI) + MIN_BMI
    }

    /// Sets the weight scalar from a BMI value (clamped into range).
    pub fn set_weight_bmi(&mut self, bmi: f64) {
        self.set_weight((bmi - MIN_BMI) / (MAX_BMI - MIN_BMI));
    }

    // ///////////////////////
    // Component weighting  //
    // ///////////////////////

    /// Looks up the derived component weight for a tag name, e.g. `baby`,
    /// `maxweight`, `averagecup`, `caucasian`. Returns `None` for names
    /// outside the component vocabulary.
    pub fn component(&self, tag: &str) -> Option<f64> {
        let value = match tag {
            "male" => self.gender,
            "female" => 1.0 - self.gender,

            "baby" => self.age_components.baby,
            "child" => self.age_components.child,
            "young" => self.age_components.young,
            "old" => self.age_components.old,

            "minweight" => self.weight_split.min,
            "averageweight" => self.weight_split.average,
            "maxweight" => self.weight_split.max,

            "minmuscle" => self.muscle_split.min,
            "averagemuscle" => self.muscle_split.average,
            "maxmuscle" => self.muscle_split.max,

            "minheight" => self.height_split.min,
            "averageheight" => self.height_split.average,
            "maxheight" => self.height_split.max,

            "mincup" => self.cup_split.min,
            "averagecup" => self.cup_split.average,
            "maxcup" => self.cup_split.max,

            "minfirmness" => self.firmness_split.min,
            "averagefirmness" => self.firmness_split.average,
            "maxfirmness" => self.firmness_split.max,

            "uncommonproportions" => self.proportions_split.min,
            "regularproportions" => self.proportions_split.average,
            "idealproportions" => self.proportions_split.max,

            "african" => self.african,
            "asian" => self.asian,
            "caucasian" => self.caucasian,

            _ => return None,
        };
        Some(value)
    }
}
