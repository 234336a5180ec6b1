//! bodykit CLI - parametric character generation from the command line.
//!
//! This binary provides commands for validating modifier libraries,
//! inspecting target catalogs, sampling random characters, and baking final
//! vertex positions.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use bodykit_cli::commands;
use bodykit_cli::commands::bake::BakeArgs;
use bodykit_cli::commands::random::RandomArgs;

/// bodykit - Parametric Character Generation
#[derive(Parser)]
#[command(name = "bodykit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a modifier library against a target catalog
    Validate {
        /// Path to the modifier library JSON
        #[arg(short, long)]
        modifiers: PathBuf,

        /// Path to the target list JSON
        #[arg(short, long)]
        targets: PathBuf,
    },

    /// Show target catalog statistics or one group's members
    Info {
        /// Path to the target list JSON
        #[arg(short, long)]
        targets: PathBuf,

        /// Dump the targets of this group
        #[arg(short, long)]
        group: Option<String>,
    },

    /// Sample a seeded random character configuration
    Random {
        /// Path to the modifier library JSON
        #[arg(short, long)]
        modifiers: PathBuf,

        /// Path to the target list JSON
        #[arg(short, long)]
        targets: PathBuf,

        /// RNG seed
        #[arg(short, long, default_value_t = 0)]
        seed: u32,

        /// Left/right symmetry, 0 to 1
        #[arg(long, default_value_t = 1.0)]
        symmetry: f64,

        /// Also randomize height
        #[arg(long)]
        height: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Apply a configuration and bake final vertex positions
    Bake {
        /// Path to the modifier library JSON
        #[arg(short, long)]
        modifiers: PathBuf,

        /// Path to the target list JSON
        #[arg(short, long)]
        targets: PathBuf,

        /// Path to the displacement buffer (little-endian i16)
        #[arg(short, long)]
        data: PathBuf,

        /// Path to the reference mesh JSON
        #[arg(long)]
        mesh: PathBuf,

        /// Path to the character configuration JSON
        #[arg(short, long)]
        config: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    let result = match &cli.command {
        Commands::Validate { modifiers, targets } => commands::validate::run(modifiers, targets),
        Commands::Info { targets, group } => commands::info::run(targets, group.as_deref()),
        Commands::Random {
            modifiers,
            targets,
            seed,
            symmetry,
            height,
            out,
        } => commands::random::run(&RandomArgs {
            modifiers,
            targets,
            seed: *seed,
            symmetry: *symmetry,
            height: *height,
            out: out.as_deref(),
        }),
        Commands::Bake {
            modifiers,
            targets,
            data,
            mesh,
            config,
            out,
        } => commands::bake::run(&BakeArgs {
            modifiers,
            targets,
            data,
            mesh,
            config,
            out: out.as_deref(),
        }),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
