//! Extraction command implementations (extract, assets, sprites)

use std::path::PathBuf;
use std::process::ExitCode;

use log::{debug, info};

use super::{PathArgs, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};
use crate::config::{find_config, load_config, merge_cli_overrides, ConfigError};
use crate::context::ExtractContext;
use crate::pipeline::{ExtractPipeline, ExtractStage};
use crate::report::OutputKind;

/// Load the configuration and build the run context.
///
/// An explicit `--config` that cannot be read is an argument error; a config
/// that does not parse or validate is a setup error.
pub(super) fn load_context(
    paths: &PathArgs,
    diagnostics: bool,
) -> Result<ExtractContext, ExitCode> {
    let config_path = paths.config.clone().or_else(find_config);

    let (config, project_root) = match config_path {
        Some(config_path) => {
            debug!("using config {}", config_path.display());
            let cfg = match load_config(Some(&config_path)) {
                Ok(cfg) => cfg,
                Err(e @ ConfigError::Io { .. }) if paths.config.is_some() => {
                    eprintln!("Error: {}", e);
                    return Err(ExitCode::from(EXIT_INVALID_ARGS));
                }
                Err(e) => {
                    eprintln!("Error loading config: {}", e);
                    return Err(ExitCode::from(EXIT_ERROR));
                }
            };
            let root = config_path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());
            (cfg, root)
        }
        None => {
            debug!("no resunpack.toml found, using defaults");
            (crate::config::default_config(), std::env::current_dir().unwrap_or_default())
        }
    };

    let mut config = config;
    merge_cli_overrides(&mut config, &paths.overrides(diagnostics));

    Ok(ExtractContext::new(config, project_root))
}

/// Run an extraction stage and print its summary.
pub fn run_extract(
    stage: ExtractStage,
    paths: &PathArgs,
    diagnostics: bool,
    verbose: bool,
) -> ExitCode {
    let context = match load_context(paths, diagnostics) {
        Ok(context) => context.with_verbose(verbose),
        Err(code) => return code,
    };

    let pipeline = ExtractPipeline::new(context);
    let report = match pipeline.run(stage) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    if pipeline.context().is_verbose() {
        let kinds = [
            OutputKind::JsonAsset,
            OutputKind::Scene,
            OutputKind::Prefab,
            OutputKind::Sprite,
            OutputKind::Diagnostic,
        ];
        for kind in kinds {
            let written: Vec<&PathBuf> = report.outputs_of(kind);
            if !written.is_empty() {
                println!("{} ({}):", kind, written.len());
                for path in written {
                    println!("  {}", path.display());
                }
            }
        }
    }
    println!("{}", report.summary());
    info!("done in {:.2?}", report.total_duration);

    ExitCode::from(EXIT_SUCCESS)
}
