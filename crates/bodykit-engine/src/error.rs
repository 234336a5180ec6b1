//! Error types for the bodykit runtime.

use thiserror::Error;

/// Result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors raised by character and blend operations.
///
/// These are validation rejections, fatal to the call but never to the
/// character: the mutated state is left as it was before the call.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No modifier with the given full name exists on the character.
    #[error("unknown modifier '{0}'")]
    UnknownModifier(String),

    /// A modifier value must be a finite number.
    #[error("value for modifier '{modifier}' is not finite")]
    NonFiniteValue {
        /// The modifier the value was destined for.
        modifier: String,
    },

    /// Age in years outside the supported range.
    #[error("invalid age: {years} years, should be minimum {min} and maximum {max}")]
    AgeOutOfRange {
        /// The rejected value.
        years: f64,
        /// Minimum supported age in years.
        min: f64,
        /// Maximum supported age in years.
        max: f64,
    },

    /// The displacement buffer does not factor into targets x vertices x 3.
    #[error(
        "displacement buffer holds {actual} values, expected {targets} targets x {vertices} vertices x 3"
    )]
    DisplacementLength {
        /// Values actually present in the buffer.
        actual: usize,
        /// Expected target count.
        targets: usize,
        /// Expected vertex count.
        vertices: usize,
    },

    /// A weight vector does not match the engine's target count.
    #[error("weight vector holds {actual} values, expected {expected}")]
    WeightLength {
        /// Values actually present.
        actual: usize,
        /// Expected target count.
        expected: usize,
    },

    /// Blend data has not been attached yet; check readiness before baking.
    #[error("target displacement data is not loaded")]
    TargetsNotLoaded,

    /// I/O error while decoding displacement data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
