//! CLI command implementations.

pub mod bake;
pub mod info;
pub mod random;
pub mod validate;
