//! Info command implementation.
//!
//! Prints target catalog statistics, or the members of one group.

use std::collections::BTreeMap;
use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use colored::Colorize;

use crate::input::load_catalog;

/// Run the info command.
pub fn run(targets_path: &Path, group: Option<&str>) -> Result<ExitCode> {
    let catalog = load_catalog(targets_path)?;

    if let Some(group) = group {
        let slots = catalog.targets_by_group(group);
        if slots.is_empty() {
            println!("{} no targets in group '{}'", "!".yellow(), group);
            return Ok(ExitCode::FAILURE);
        }
        println!("{} {}", "Group:".cyan().bold(), group);
        for &slot in slots {
            let target = catalog.target(slot);
            if target.variables.is_empty() {
                println!("  {}", target.path);
            } else {
                println!(
                    "  {} {}",
                    target.path,
                    format!("[{}]", target.variables.join(", ")).dimmed()
                );
            }
        }
        println!("\n{} target(s)", slots.len());
        return Ok(ExitCode::SUCCESS);
    }

    let mut group_sizes: BTreeMap<&str, usize> = BTreeMap::new();
    for target in catalog.targets() {
        *group_sizes.entry(target.group.as_str()).or_default() += 1;
    }

    println!("{} {}", "Targets:".cyan().bold(), catalog.len());
    println!("{} {}", "Groups:".cyan().bold(), group_sizes.len());
    let mut sized: Vec<(&str, usize)> = group_sizes.into_iter().collect();
    sized.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    for (group, size) in sized.iter().take(20) {
        println!("  {:>5}  {}", size, group);
    }
    if sized.len() > 20 {
        println!("  {} more group(s)", sized.len() - 20);
    }
    Ok(ExitCode::SUCCESS)
}
