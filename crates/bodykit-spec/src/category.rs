//! Macro categories and their tag vocabulary.
//!
//! Every morph target path is tokenized against a fixed, closed vocabulary of
//! tags. Each tag belongs to exactly one macro category (the nine core
//! body-shape axes). Tokens outside the vocabulary stay part of the target's
//! group string and are never an error.

use serde::{Deserialize, Serialize};

/// The nine macro body-shape categories.
///
/// Variants are declared in alphabetical order of their names so the derived
/// `Ord` matches the lexicographic ordering used for dependency lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MacroCategory {
    /// Age axis (baby, child, young, old).
    Age,
    /// Body proportions axis (uncommon, regular, ideal).
    BodyProportions,
    /// Breast firmness axis.
    BreastFirmness,
    /// Breast size axis.
    BreastSize,
    /// Gender axis (female, male).
    Gender,
    /// Height axis.
    Height,
    /// Muscle axis.
    Muscle,
    /// Ethnicity axis (african, asian, caucasian).
    Race,
    /// Weight axis.
    Weight,
}

/// Tag vocabulary: (tag, owning category) pairs.
const TAG_TABLE: &[(&str, MacroCategory)] = &[
    ("baby", MacroCategory::Age),
    ("child", MacroCategory::Age),
    ("young", MacroCategory::Age),
    ("old", MacroCategory::Age),
    ("uncommonproportions", MacroCategory::BodyProportions),
    ("regularproportions", MacroCategory::BodyProportions),
    ("idealproportions", MacroCategory::BodyProportions),
    ("minfirmness", MacroCategory::BreastFirmness),
    ("averagefirmness", MacroCategory::BreastFirmness),
    ("maxfirmness", MacroCategory::BreastFirmness),
    ("mincup", MacroCategory::BreastSize),
    ("averagecup", MacroCategory::BreastSize),
    ("maxcup", MacroCategory::BreastSize),
    ("female", MacroCategory::Gender),
    ("male", MacroCategory::Gender),
    ("minheight", MacroCategory::Height),
    ("averageheight", MacroCategory::Height),
    ("maxheight", MacroCategory::Height),
    ("minmuscle", MacroCategory::Muscle),
    ("averagemuscle", MacroCategory::Muscle),
    ("maxmuscle", MacroCategory::Muscle),
    ("african", MacroCategory::Race),
    ("asian", MacroCategory::Race),
    ("caucasian", MacroCategory::Race),
    ("minweight", MacroCategory::Weight),
    ("averageweight", MacroCategory::Weight),
    ("maxweight", MacroCategory::Weight),
];

impl MacroCategory {
    /// Returns the category name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            MacroCategory::Age => "age",
            MacroCategory::BodyProportions => "bodyproportions",
            MacroCategory::BreastFirmness => "breastfirmness",
            MacroCategory::BreastSize => "breastsize",
            MacroCategory::Gender => "gender",
            MacroCategory::Height => "height",
            MacroCategory::Muscle => "muscle",
            MacroCategory::Race => "race",
            MacroCategory::Weight => "weight",
        }
    }

    /// Returns all categories in alphabetical order.
    pub fn all() -> &'static [MacroCategory] {
        &[
            MacroCategory::Age,
            MacroCategory::BodyProportions,
            MacroCategory::BreastFirmness,
            MacroCategory::BreastSize,
            MacroCategory::Gender,
            MacroCategory::Height,
            MacroCategory::Muscle,
            MacroCategory::Race,
            MacroCategory::Weight,
        ]
    }

    /// Returns the category a tag belongs to, if the tag is in the vocabulary.
    pub fn of_tag(tag: &str) -> Option<MacroCategory> {
        TAG_TABLE
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, category)| *category)
    }

    /// Returns the tags belonging to this category.
    pub fn tags(&self) -> Vec<&'static str> {
        TAG_TABLE
            .iter()
            .filter(|(_, category)| category == self)
            .map(|(tag, _)| *tag)
            .collect()
    }

    /// Returns the full tag vocabulary as (tag, category) pairs.
    pub fn tag_table() -> &'static [(&'static str, MacroCategory)] {
        TAG_TABLE
    }
}

impl std::fmt::Display for MacroCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for MacroCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "age" => Ok(MacroCategory::Age),
            "bodyproportions" => Ok(MacroCategory::BodyProportions),
            "breastfirmness" => Ok(MacroCategory::BreastFirmness),
            "breastsize" => Ok(MacroCategory::BreastSize),
            "gender" => Ok(MacroCategory::Gender),
            "height" => Ok(MacroCategory::Height),
            "muscle" => Ok(MacroCategory::Muscle),
            "race" => Ok(MacroCategory::Race),
            "weight" => Ok(MacroCategory::Weight),
            _ => Err(format!("unknown macro category: {}", s)),
        }
    }
}
