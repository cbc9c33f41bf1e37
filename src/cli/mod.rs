//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod extract;
mod inspect;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::config::CliOverrides;
use crate::pipeline::ExtractStage;

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// resunpack - Extract sprites and assets from packed cc.* resource bundles
#[derive(Parser)]
#[command(name = "resunpack")]
#[command(about = "Extract sprites, scenes, prefabs and JSON assets from packed resource bundles")]
#[command(version)]
pub struct Cli {
    /// Log every file and output (debug level)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Input and output locations, overriding resunpack.toml
#[derive(Args, Debug, Default, Clone)]
pub struct PathArgs {
    /// Config file (default: resunpack.toml found from the working directory up)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory scanned for SpriteFrame fragments
    #[arg(long)]
    pub program: Option<PathBuf>,

    /// Directory of resource descriptors
    #[arg(long)]
    pub resources: Option<PathBuf>,

    /// Build manifest script
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Directory of atlas images
    #[arg(long)]
    pub raw_assets: Option<PathBuf>,

    /// Output directory for JSON assets
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Output directory for sprite PNGs
    #[arg(long)]
    pub images: Option<PathBuf>,
}

impl PathArgs {
    /// Overrides with relative paths anchored at the working directory.
    pub fn overrides(&self, diagnostics: bool) -> CliOverrides {
        let cwd = std::env::current_dir().unwrap_or_default();
        let anchor = |p: &Option<PathBuf>| p.as_ref().map(|p| cwd.join(p));
        CliOverrides {
            program: anchor(&self.program),
            resources: anchor(&self.resources),
            manifest: anchor(&self.manifest),
            raw_assets: anchor(&self.raw_assets),
            out: anchor(&self.out),
            images: anchor(&self.images),
            diagnostics: diagnostics.then_some(true),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run everything: scripts, JSON assets, scenes, prefabs and sprites
    Extract {
        #[command(flatten)]
        paths: PathArgs,

        /// Also write aliases.json, scripts.json and sprite_frames.json
        #[arg(long)]
        diagnostics: bool,
    },

    /// Walk resource JSON and write JSON assets, scenes and prefabs
    Assets {
        #[command(flatten)]
        paths: PathArgs,
    },

    /// Scan SpriteFrame fragments and slice sprites out of their atlases
    Sprites {
        #[command(flatten)]
        paths: PathArgs,
    },

    /// Print the uuid -> script name table of the build manifest
    Scripts {
        #[command(flatten)]
        paths: PathArgs,
    },

    /// List the SpriteFrame fragments found in one file
    Scan {
        /// File to scan
        input: PathBuf,
    },
}

/// Initialise logging. `RUST_LOG` overrides the level chosen by flags.
fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let env = env_logger::Env::default().default_filter_or(level);
    // A second init (e.g. from tests) is harmless
    let _ = env_logger::Builder::from_env(env).format_timestamp(None).try_init();
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Extract { paths, diagnostics } => {
            extract::run_extract(ExtractStage::All, &paths, diagnostics, cli.verbose)
        }
        Commands::Assets { paths } => {
            extract::run_extract(ExtractStage::Assets, &paths, false, cli.verbose)
        }
        Commands::Sprites { paths } => {
            extract::run_extract(ExtractStage::Sprites, &paths, false, cli.verbose)
        }
        Commands::Scripts { paths } => inspect::run_scripts(&paths),
        Commands::Scan { input } => inspect::run_scan(&input),
    }
}
