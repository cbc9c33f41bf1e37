//! Configuration schema types for `resunpack.toml`
//!
//! Every section and field has a default, so an empty file (or no file at
//! all) describes the conventional bundle layout.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::atlas::TextureMatch;

/// Largest accepted JSON indent.
pub const MAX_INDENT: usize = 16;

/// Input and output locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Build output scanned for sprite frame fragments
    pub program: PathBuf,
    /// Resource descriptors walked for assets
    pub resources: PathBuf,
    /// Build manifest script
    pub manifest: PathBuf,
    /// Atlas images
    pub raw_assets: PathBuf,
    /// JSON asset output directory
    pub out: PathBuf,
    /// Sprite PNG output directory
    pub images: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("program"),
            resources: PathBuf::from("program/res"),
            manifest: PathBuf::from("program/src/project.js"),
            raw_assets: PathBuf::from("raw-assets"),
            out: PathBuf::from("out"),
            images: PathBuf::from("images"),
        }
    }
}

/// Which files are read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Extensions of descriptor files, for both the walk and the fragment scan
    pub descriptor_extensions: Vec<String>,
    /// Extensions of atlas images
    pub image_extensions: Vec<String>,
    /// How texture keys find their image file
    pub texture_match: TextureMatch,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            descriptor_extensions: vec!["json".to_string()],
            image_extensions: vec!["png".to_string(), "jpg".to_string()],
            texture_match: TextureMatch::Bucket,
        }
    }
}

/// How outputs are written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Spaces per JSON indent level
    pub indent: usize,
    /// Also write `aliases.json`, `scripts.json` and `sprite_frames.json`
    pub diagnostics: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { indent: 4, diagnostics: false }
    }
}

/// Complete `resunpack.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResunpackConfig {
    pub paths: PathsConfig,
    pub scan: ScanConfig,
    pub output: OutputConfig,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "scan.image_extensions")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "resunpack.toml: '{}' {}", self.field, self.message)
    }
}

fn check_extensions(field: &str, extensions: &[String], errors: &mut Vec<ConfigValidationError>) {
    if extensions.is_empty() {
        errors.push(ConfigValidationError {
            field: field.to_string(),
            message: "must list at least one extension".to_string(),
        });
    }
    if extensions.iter().any(|e| e.trim_start_matches('.').is_empty()) {
        errors.push(ConfigValidationError {
            field: field.to_string(),
            message: "must not contain empty extensions".to_string(),
        });
    }
}

impl ResunpackConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        check_extensions(
            "scan.descriptor_extensions",
            &self.scan.descriptor_extensions,
            &mut errors,
        );
        check_extensions("scan.image_extensions", &self.scan.image_extensions, &mut errors);

        if self.output.indent > MAX_INDENT {
            errors.push(ConfigValidationError {
                field: "output.indent".to_string(),
                message: format!("must be at most {}", MAX_INDENT),
            });
        }

        let paths = [
            ("paths.program", &self.paths.program),
            ("paths.resources", &self.paths.resources),
            ("paths.manifest", &self.paths.manifest),
            ("paths.raw_assets", &self.paths.raw_assets),
            ("paths.out", &self.paths.out),
            ("paths.images", &self.paths.images),
        ];
        for (field, path) in paths {
            if path.as_os_str().is_empty() {
                errors.push(ConfigValidationError {
                    field: field.to_string(),
                    message: "must not be empty".to_string(),
                });
            }
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_all_defaults() {
        let config: ResunpackConfig = toml::from_str("").unwrap();
        assert_eq!(config, ResunpackConfig::default());
        assert_eq!(config.paths.resources, PathBuf::from("program/res"));
        assert_eq!(config.paths.manifest, PathBuf::from("program/src/project.js"));
        assert_eq!(config.scan.image_extensions, vec!["png", "jpg"]);
        assert_eq!(config.scan.texture_match, TextureMatch::Bucket);
        assert_eq!(config.output.indent, 4);
        assert!(!config.output.diagnostics);
        assert!(config.is_valid());
    }

    #[test]
    fn test_full_config_parse() {
        let toml = r#"
[paths]
program = "build/web"
resources = "build/web/res"
manifest = "build/web/src/project.js"
raw_assets = "build/raw"
out = "dist/json"
images = "dist/png"

[scan]
descriptor_extensions = ["json", "txt"]
image_extensions = ["png"]
texture_match = "stem"

[output]
indent = 2
diagnostics = true
"#;
        let config: ResunpackConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.paths.program, PathBuf::from("build/web"));
        assert_eq!(config.paths.raw_assets, PathBuf::from("build/raw"));
        assert_eq!(config.paths.images, PathBuf::from("dist/png"));
        assert_eq!(config.scan.descriptor_extensions, vec!["json", "txt"]);
        assert_eq!(config.scan.texture_match, TextureMatch::Stem);
        assert_eq!(config.output.indent, 2);
        assert!(config.output.diagnostics);
        assert!(config.is_valid());
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: ResunpackConfig = toml::from_str("[paths]\nout = \"json\"\n").unwrap();
        assert_eq!(config.paths.out, PathBuf::from("json"));
        assert_eq!(config.paths.images, PathBuf::from("images"));
        assert_eq!(config.output, OutputConfig::default());
    }

    #[test]
    fn test_unknown_texture_match_rejected() {
        let result: Result<ResunpackConfig, _> =
            toml::from_str("[scan]\ntexture_match = \"fuzzy\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_empty_extensions() {
        let mut config = ResunpackConfig::default();
        config.scan.image_extensions.clear();
        config.scan.descriptor_extensions = vec![".".to_string()];

        let errors = config.validate();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| e.field == "scan.image_extensions"));
        assert!(errors.iter().any(|e| e.field == "scan.descriptor_extensions"));
    }

    #[test]
    fn test_validate_indent_limit() {
        let mut config = ResunpackConfig::default();
        config.output.indent = MAX_INDENT;
        assert!(config.is_valid());

        config.output.indent = MAX_INDENT + 1;
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("'output.indent'"));
    }

    #[test]
    fn test_validate_empty_path() {
        let mut config = ResunpackConfig::default();
        config.paths.out = PathBuf::new();
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "paths.out");
    }
}
