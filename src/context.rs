//! Extraction context containing configuration and resolved locations.

use crate::config::{resolve_path, ResunpackConfig};
use crate::output::AssetWriter;
use std::path::{Path, PathBuf};

/// Configuration and project root for one extraction run.
///
/// Relative configured paths are resolved against the project root, which is
/// the directory holding `resunpack.toml` or the working directory.
#[derive(Debug, Clone)]
pub struct ExtractContext {
    /// The loaded configuration
    config: ResunpackConfig,
    /// Directory relative paths resolve against
    project_root: PathBuf,
    /// Whether to list every output in the summary
    verbose: bool,
}

impl ExtractContext {
    /// Create a new extraction context.
    pub fn new(config: ResunpackConfig, project_root: PathBuf) -> Self {
        Self { config, project_root, verbose: false }
    }

    /// Get the configuration.
    pub fn config(&self) -> &ResunpackConfig {
        &self.config
    }

    /// Get the project root directory.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Whether verbose mode is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Set verbose mode.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        resolve_path(&self.project_root, path)
    }

    /// Directory scanned for sprite frame fragments.
    pub fn program_dir(&self) -> PathBuf {
        self.resolve(&self.config.paths.program)
    }

    /// Directory of resource descriptors.
    pub fn resources_dir(&self) -> PathBuf {
        self.resolve(&self.config.paths.resources)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.resolve(&self.config.paths.manifest)
    }

    pub fn raw_assets_dir(&self) -> PathBuf {
        self.resolve(&self.config.paths.raw_assets)
    }

    /// JSON output directory.
    pub fn out_dir(&self) -> PathBuf {
        self.resolve(&self.config.paths.out)
    }

    /// Sprite PNG output directory.
    pub fn images_dir(&self) -> PathBuf {
        self.resolve(&self.config.paths.images)
    }

    /// Writer for JSON assets into the output directory.
    pub fn asset_writer(&self) -> AssetWriter {
        AssetWriter::new(self.out_dir(), self.config.output.indent)
    }

    pub fn diagnostics_enabled(&self) -> bool {
        self.config.output.diagnostics
    }
}
