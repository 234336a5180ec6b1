//! bodykit CLI library.
//!
//! This crate provides the functionality behind the `bodykit` binary:
//! input loading and the validate/info/random/bake commands.

pub mod commands;
pub mod input;
