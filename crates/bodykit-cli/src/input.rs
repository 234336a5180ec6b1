//! Input loading for the bodykit CLI.
//!
//! All inputs are JSON except the displacement buffer, which is the raw
//! little-endian i16 stream (`n_targets x n_vertices x 3`, target-major,
//! targets in catalog order).

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use bodykit_engine::TargetData;
use bodykit_spec::{CharacterConfig, ModifierLibrary, TargetCatalog};

/// On-disk mesh shape: reference vertex positions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshFile {
    /// Vertex positions, one `[x, y, z]` triple per vertex.
    pub vertices: Vec<[f32; 3]>,
}

/// Loads a target catalog from JSON: either an index object
/// (`{"targets": {"<path>": ...}}`) or a plain array of paths.
pub fn load_catalog(path: &Path) -> Result<TargetCatalog> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read target list: {}", path.display()))?;
    if let Ok(catalog) = TargetCatalog::from_target_list_json(&text) {
        return Ok(catalog);
    }
    let paths: Vec<String> = serde_json::from_str(&text)
        .with_context(|| format!("target list is neither an index nor an array: {}", path.display()))?;
    Ok(TargetCatalog::from_paths(paths))
}

/// Loads a modifier library from JSON.
pub fn load_library(path: &Path) -> Result<ModifierLibrary> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read modifier library: {}", path.display()))?;
    ModifierLibrary::from_json(&text)
        .with_context(|| format!("failed to parse modifier library: {}", path.display()))
}

/// Loads a character configuration from JSON.
pub fn load_config(path: &Path) -> Result<CharacterConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    CharacterConfig::from_json(&text)
        .with_context(|| format!("failed to parse config: {}", path.display()))
}

/// Loads reference mesh vertices from JSON.
pub fn load_mesh(path: &Path) -> Result<MeshFile> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read mesh: {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse mesh: {}", path.display()))
}

/// Loads the displacement buffer for a known catalog/mesh shape.
pub fn load_displacements(path: &Path, n_targets: usize, n_vertices: usize) -> Result<TargetData> {
    let file = File::open(path)
        .with_context(|| format!("failed to open displacement data: {}", path.display()))?;
    TargetData::from_reader(BufReader::new(file), n_targets, n_vertices)
        .with_context(|| format!("failed to decode displacement data: {}", path.display()))
}

/// Writes a string to a file or stdout when no path is given.
pub fn write_output(out: Option<&Path>, content: &str) -> Result<()> {
    match out {
        Some(path) => std::fs::write(path, content)
            .with_context(|| format!("failed to write output: {}", path.display())),
        None => {
            println!("{}", content);
            Ok(())
        }
    }
}
