//! bodykit Data Model Library
//!
//! This crate provides the data model for bodykit: the macro-category/tag
//! vocabulary, morph-target path parsing, the immutable target catalog, the
//! modifier-library JSON types, character configurations, and validation.
//!
//! # Overview
//!
//! A bodykit character is shaped by **modifiers** (user-facing sliders) that
//! resolve to weighted combinations of **targets** (pre-authored per-vertex
//! displacement fields). This crate owns everything static about that
//! mapping:
//!
//! - **Categories**: the nine macro body-shape axes and their closed tag
//!   vocabulary (`baby`, `maxweight`, `caucasian`, ...)
//! - **Targets**: path parsing into group + category tags, and the
//!   alphabetically ordered catalog that fixes every target's dense slot
//! - **Library**: the JSON description of all modifier groups and members
//! - **Config**: the exported slider state with a canonical BLAKE3 hash
//!
//! The runtime half (factors, the modifier graph, blending) lives in
//! `bodykit-engine`.
//!
//! # Example
//!
//! ```
//! use bodykit_spec::{validate_library, ModifierLibrary, TargetCatalog};
//!
//! let catalog = TargetCatalog::from_paths([
//!     "data/targets/macrodetails/caucasian-female-young.target",
//!     "data/targets/macrodetails/caucasian-male-old.target",
//! ]);
//!
//! let library = ModifierLibrary::from_json(
//!     r#"[{"group": "macrodetails", "modifiers": [{"macrovar": "Age"}]}]"#,
//! ).unwrap();
//!
//! let result = validate_library(&library, &catalog);
//! assert!(result.is_ok());
//! ```
//!
//! # Modules
//!
//! - [`category`]: Macro categories and the tag vocabulary
//! - [`target`]: Target path parsing
//! - [`catalog`]: The immutable target catalog
//! - [`library`]: Modifier library JSON types
//! - [`config`]: Character configuration and canonical hashing
//! - [`validation`]: Library validation
//! - [`error`]: Error and warning types

pub mod catalog;
pub mod category;
pub mod config;
pub mod error;
pub mod library;
pub mod target;
pub mod validation;

// Re-export commonly used types at the crate root
pub use catalog::{TargetBinding, TargetCatalog};
pub use category::MacroCategory;
pub use config::CharacterConfig;
pub use error::{
    ErrorCode, ModelError, ValidationError, ValidationResult, ValidationWarning, WarningCode,
};
pub use library::{ModifierDef, ModifierGroupDef, ModifierLibrary, UniversalNames};
pub use target::{parse_path, TargetMeta};
pub use validation::{resolve_macro_variable, validate_library};
