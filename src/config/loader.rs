//! Configuration loading and discovery for `resunpack.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::ResunpackConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file.
pub const CONFIG_FILE_NAME: &str = "resunpack.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// TOML parsing error
    #[error("Failed to parse resunpack.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override the fragment scan directory
    pub program: Option<PathBuf>,
    /// Override the resource descriptor directory
    pub resources: Option<PathBuf>,
    /// Override the build manifest path
    pub manifest: Option<PathBuf>,
    /// Override the atlas image directory
    pub raw_assets: Option<PathBuf>,
    /// Override the JSON output directory
    pub out: Option<PathBuf>,
    /// Override the sprite output directory
    pub images: Option<PathBuf>,
    /// Force diagnostics output
    pub diagnostics: Option<bool>,
}

/// Find resunpack.toml by walking up from the current working directory.
///
/// # Returns
/// - `Some(path)` if a resunpack.toml file is found
/// - `None` if no config file is found
pub fn find_config() -> Option<PathBuf> {
    env::current_dir().ok().and_then(find_config_from)
}

/// Find resunpack.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from a resunpack.toml file.
///
/// If a path is provided, loads from that file. Otherwise, uses `find_config()`
/// to locate the config file. If no config file is found, returns the default
/// configuration.
///
/// # Example
/// ```ignore
/// let config = load_config(Some(Path::new("game/resunpack.toml")))?;
/// ```
pub fn load_config(path: Option<&Path>) -> Result<ResunpackConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => load_config_file(&p),
        None => Ok(default_config()),
    }
}

/// Load configuration from a specific file path.
fn load_config_file(path: &Path) -> Result<ResunpackConfig, ConfigError> {
    let contents = fs::read_to_string(path)
        .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
    let config: ResunpackConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    Ok(config)
}

/// Configuration used when no resunpack.toml is found.
pub fn default_config() -> ResunpackConfig {
    ResunpackConfig::default()
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values.
pub fn merge_cli_overrides(config: &mut ResunpackConfig, overrides: &CliOverrides) {
    let paths = &mut config.paths;
    let pairs = [
        (&mut paths.program, &overrides.program),
        (&mut paths.resources, &overrides.resources),
        (&mut paths.manifest, &overrides.manifest),
        (&mut paths.raw_assets, &overrides.raw_assets),
        (&mut paths.out, &overrides.out),
        (&mut paths.images, &overrides.images),
    ];
    for (target, value) in pairs {
        if let Some(value) = value {
            *target = value.clone();
        }
    }

    if let Some(diagnostics) = overrides.diagnostics {
        config.output.diagnostics = diagnostics;
    }
}

/// Get the project root directory from a config file path.
///
/// Returns the parent directory of the resunpack.toml file.
pub fn project_root(config_path: &Path) -> Option<&Path> {
    config_path.parent()
}

/// Resolve a path relative to the project root.
///
/// If the path is absolute, returns it unchanged.
/// If relative, joins it with the project root.
pub fn resolve_path(project_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}
