//! Scene and prefab re-serialization
//!
//! A packed resource file is an array of asset records. A record that is
//! itself an array led by a `cc.SceneAsset` or `cc.Prefab` object is a whole
//! scene or prefab, and is written out unchanged as a standalone document.

use std::path::Path;

use serde_json::Value;

use crate::error::ExtractError;
use crate::output::AssetWriter;
use crate::report::{ExtractReport, OutputKind};
use crate::walker::{require_str, type_of, PREFAB, SCENE_ASSET};

/// Which kind of document a record holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneKind {
    Scene,
    Prefab,
}

impl SceneKind {
    /// Classify a leading type name.
    pub fn from_type(type_name: &str) -> Option<Self> {
        match type_name {
            SCENE_ASSET => Some(SceneKind::Scene),
            PREFAB => Some(SceneKind::Prefab),
            _ => None,
        }
    }

    /// File name suffix: `.fire.json` or `.prefab.json`.
    pub fn suffix(self) -> &'static str {
        match self {
            SceneKind::Scene => ".fire.json",
            SceneKind::Prefab => ".prefab.json",
        }
    }

    pub fn output_kind(self) -> OutputKind {
        match self {
            SceneKind::Scene => OutputKind::Scene,
            SceneKind::Prefab => OutputKind::Prefab,
        }
    }
}

/// A scene or prefab record found in a resource file.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneDocument<'a> {
    pub kind: SceneKind,
    /// `_name` of the leading object
    pub name: &'a str,
    /// Position of the record in the top-level array
    pub index: usize,
    /// The whole record, written as is
    pub body: &'a Value,
}

/// Find the scene and prefab records of a decoded resource file.
///
/// Records without a usable `_name` yield a malformed-asset error naming
/// the file and record index; the other records are unaffected.
pub fn find_scene_documents<'a>(
    root: &'a Value,
    source: &Path,
) -> Vec<Result<SceneDocument<'a>, ExtractError>> {
    let Some(records) = root.as_array() else {
        return vec![Err(ExtractError::malformed(
            format!("'{}'", source.display()),
            "top-level value is not an array",
        ))];
    };

    let mut found = Vec::new();
    for (index, record) in records.iter().enumerate() {
        // Top-level objects are standalone assets, handled by the walker.
        let Value::Array(items) = record else {
            continue;
        };
        let Some(Value::Object(head)) = items.first() else {
            continue;
        };
        let Some(kind) = type_of(head).and_then(SceneKind::from_type) else {
            continue;
        };

        let context = format!("'{}' element {}", source.display(), index);
        found.push(require_str(head, "_name", &context).map(|name| SceneDocument {
            kind,
            name,
            index,
            body: record,
        }));
    }
    found
}

/// Write every scene and prefab record of `root`, recording results in `report`.
///
/// Returns the number of documents written.
pub fn write_scene_documents(
    root: &Value,
    source: &Path,
    writer: &AssetWriter,
    report: &mut ExtractReport,
) -> usize {
    let mut written = 0;
    for document in find_scene_documents(root, source) {
        let result = document.and_then(|doc| {
            writer.write(doc.name, doc.kind.suffix(), doc.body).map(|path| (doc.kind, path))
        });
        match result {
            Ok((kind, path)) => {
                report.record_output(kind.output_kind(), path);
                written += 1;
            }
            Err(e) => report.record_skip(&e),
        }
    }
    written
}
