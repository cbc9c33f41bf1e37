//! Error taxonomy for extraction runs
//!
//! Every variant except [`ExtractError::Setup`] is recoverable: it is caught at
//! the boundary of the file, fragment, node or sprite being processed, logged,
//! recorded in the run report, and the run moves on.

use std::path::PathBuf;
use thiserror::Error;

use crate::output::OutputError;

/// Error raised while extracting a single item.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExtractError {
    /// A file is missing or unreadable
    #[error("Cannot read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A JSON document, fragment or image could not be decoded
    #[error("Cannot decode {context}: {message}")]
    Decode { context: String, message: String },
    /// An expected field is absent or has the wrong type
    #[error("Malformed asset in {context}: {message}")]
    MalformedAsset { context: String, message: String },
    /// A texture decodes to something the slicer cannot handle
    #[error("Unsupported image format for texture '{texture}' ({}): {message}", path.display())]
    UnsupportedImageFormat { texture: String, path: PathBuf, message: String },
    /// Writing an output file failed
    #[error("Cannot write '{}': {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: OutputError,
    },
    /// The run cannot start or continue at all
    #[error("Setup failed: {0}")]
    Setup(String),
}

impl ExtractError {
    /// Shorthand for a [`ExtractError::MalformedAsset`].
    pub fn malformed(context: impl Into<String>, message: impl Into<String>) -> Self {
        ExtractError::MalformedAsset { context: context.into(), message: message.into() }
    }

    /// Shorthand for a [`ExtractError::Decode`].
    pub fn decode(context: impl Into<String>, message: impl ToString) -> Self {
        ExtractError::Decode { context: context.into(), message: message.to_string() }
    }

    /// Short machine-friendly label used in the run summary.
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractError::Io { .. } => "io",
            ExtractError::Decode { .. } => "decode",
            ExtractError::MalformedAsset { .. } => "malformed",
            ExtractError::UnsupportedImageFormat { .. } => "unsupported_image",
            ExtractError::Encode { .. } => "encode",
            ExtractError::Setup(_) => "setup",
        }
    }

    /// Whether the run should stop on this error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ExtractError::Setup(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_display() {
        let err = ExtractError::malformed("res/a.json element 3", "missing string field '_name'");
        assert_eq!(
            err.to_string(),
            "Malformed asset in res/a.json element 3: missing string field '_name'"
        );
        assert_eq!(err.kind(), "malformed");
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_io_display_includes_path() {
        let err = ExtractError::Io {
            path: PathBuf::from("program/src/project.js"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        let msg = err.to_string();
        assert!(msg.contains("program/src/project.js"));
        assert!(msg.contains("not found"));
    }

    #[test]
    fn test_setup_is_fatal() {
        assert!(ExtractError::Setup("cannot create out".to_string()).is_fatal());
    }
}
