//! Validate command implementation.
//!
//! Validates a modifier library against a target catalog and reports graph
//! construction diagnostics.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;

use bodykit_engine::Character;
use bodykit_spec::validate_library;

use crate::input::{load_catalog, load_library};

/// Run the validate command.
///
/// # Returns
/// Exit code: 0 if the library is valid, 1 otherwise.
pub fn run(modifiers_path: &Path, targets_path: &Path) -> Result<ExitCode> {
    println!(
        "{} {}",
        "Validating:".cyan().bold(),
        modifiers_path.display()
    );

    let catalog = load_catalog(targets_path)?;
    let library = load_library(modifiers_path)?;
    println!(
        "{} {} targets, {} modifier definitions",
        "Loaded:".dimmed(),
        catalog.len(),
        library.modifier_count()
    );

    let result = validate_library(&library, &catalog);
    for error in &result.errors {
        println!("  {} {}", "x".red().bold(), error);
    }
    for warning in &result.warnings {
        println!("  {} {}", "!".yellow(), warning);
    }

    // Surface graph construction diagnostics too; conflicts show up here.
    let (_, report) = Character::new(Arc::new(catalog), &library);
    for issue in &report.issues {
        println!("  {} {}", "!".yellow(), issue);
    }

    if result.is_ok() {
        println!(
            "\n{} Library is valid ({} warning(s))",
            "SUCCESS".green().bold(),
            result.warnings.len() + report.issues.len()
        );
        Ok(ExitCode::SUCCESS)
    } else {
        println!(
            "\n{} Library has {} error(s)",
            "FAILED".red().bold(),
            result.errors.len()
        );
        Ok(ExitCode::FAILURE)
    }
}
