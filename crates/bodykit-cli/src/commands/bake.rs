//! Bake command implementation.
//!
//! Applies a character configuration and writes the final vertex positions.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;

use bodykit_engine::{BakeOutcome, Character};

use crate::input::{
    load_catalog, load_config, load_displacements, load_library, load_mesh, write_output, MeshFile,
};

/// Options for the bake command.
#[derive(Debug, Clone)]
pub struct BakeArgs<'a> {
    /// Modifier library path.
    pub modifiers: &'a Path,
    /// Target list path.
    pub targets: &'a Path,
    /// Displacement buffer path.
    pub data: &'a Path,
    /// Reference mesh path.
    pub mesh: &'a Path,
    /// Character configuration path.
    pub config: &'a Path,
    /// Output path; stdout when absent.
    pub out: Option<&'a Path>,
}

/// Run the bake command.
pub fn run(args: &BakeArgs<'_>) -> Result<ExitCode> {
    let catalog = Arc::new(load_catalog(args.targets)?);
    let library = load_library(args.modifiers)?;
    let mesh = load_mesh(args.mesh)?;
    let data = load_displacements(args.data, catalog.len(), mesh.vertices.len())?;
    let config = load_config(args.config)?;

    let (mut character, report) = Character::new(catalog, &library);
    for issue in &report.issues {
        log::warn!("{}", issue);
    }

    character
        .import_config(&config)
        .context("failed to apply config")?;
    character
        .attach_target_data(data, mesh.vertices)
        .context("failed to attach displacement data")?;

    // A one-shot tool always wants the fresh result; drop the throttle.
    if let Some(blend) = character.blend_mut() {
        blend.force_next_bake();
    }
    let vertices = match character.bake().context("bake failed")? {
        BakeOutcome::Baked(vertices) => vertices,
        BakeOutcome::Skipped(reason) => anyhow::bail!("bake skipped: {:?}", reason),
    };

    let baked = MeshFile { vertices };
    write_output(args.out, &serde_json::to_string(&baked)?)?;

    eprintln!(
        "{} {} vertex position(s)",
        "Baked:".green().bold(),
        baked.vertices.len()
    );
    Ok(ExitCode::SUCCESS)
}
