//! Extraction run report.
//!
//! Per-item failures never abort a run. They are logged where they happen and
//! collected here so the summary can list everything that was skipped.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use log::{debug, warn};

use crate::error::ExtractError;

/// Kind of file written by a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum OutputKind {
    /// `<name>.json` from a JSON asset node
    JsonAsset,
    /// `<name>.fire.json`
    Scene,
    /// `<name>.prefab.json`
    Prefab,
    /// `<name>.png` cropped from an atlas
    Sprite,
    /// Alias, script and sprite frame tables
    Diagnostic,
}

impl std::fmt::Display for OutputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            OutputKind::JsonAsset => "json assets",
            OutputKind::Scene => "scenes",
            OutputKind::Prefab => "prefabs",
            OutputKind::Sprite => "sprites",
            OutputKind::Diagnostic => "diagnostics",
        };
        write!(f, "{}", label)
    }
}

/// An item that was skipped, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedItem {
    /// Error category (see [`ExtractError::kind`])
    pub kind: &'static str,
    /// Human readable error message
    pub reason: String,
}

/// Everything a run produced or skipped.
#[derive(Debug, Default)]
pub struct ExtractReport {
    /// Files written, in write order
    pub outputs: Vec<(OutputKind, PathBuf)>,
    /// Items skipped because of a recoverable error
    pub skipped: Vec<SkippedItem>,
    /// How many object nodes of each `__type__` the walker classified
    pub node_types: BTreeMap<String, usize>,
    /// Resource files walked
    pub files_walked: usize,
    /// Sprite frames decoded by the fragment scanner
    pub frames_scanned: usize,
    /// Sprite frame nodes found while walking resources
    pub frames_indexed: usize,
    /// Alias table size at the end of the run
    pub aliases: usize,
    /// Script table size
    pub scripts: usize,
    /// Total run duration
    pub total_duration: Duration,
}

impl ExtractReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a written file.
    pub fn record_output(&mut self, kind: OutputKind, path: PathBuf) {
        debug!("wrote {}", path.display());
        self.outputs.push((kind, path));
    }

    /// Log and record a skipped item.
    pub fn record_skip(&mut self, error: &ExtractError) {
        warn!("skipped: {}", error);
        self.skipped.push(SkippedItem { kind: error.kind(), reason: error.to_string() });
    }

    /// Count one classified node.
    pub fn count_node_type(&mut self, type_name: &str) {
        *self.node_types.entry(type_name.to_string()).or_insert(0) += 1;
    }

    /// Set the total duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.total_duration = duration;
        self
    }

    /// Number of written files of one kind.
    pub fn output_count(&self, kind: OutputKind) -> usize {
        self.outputs.iter().filter(|(k, _)| *k == kind).count()
    }

    /// Paths of written files of one kind.
    pub fn outputs_of(&self, kind: OutputKind) -> Vec<&PathBuf> {
        self.outputs.iter().filter(|(k, _)| *k == kind).map(|(_, p)| p).collect()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// Whether nothing was skipped.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }

    /// Format a summary of the run.
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();

        let mut by_kind: BTreeMap<OutputKind, usize> = BTreeMap::new();
        for (kind, _) in &self.outputs {
            *by_kind.entry(*kind).or_insert(0) += 1;
        }
        let written = if by_kind.is_empty() {
            "nothing".to_string()
        } else {
            by_kind.iter().map(|(k, n)| format!("{} {}", n, k)).collect::<Vec<_>>().join(", ")
        };

        lines.push(format!(
            "Extracted {} from {} resource files in {:?}",
            written, self.files_walked, self.total_duration
        ));
        lines.push(format!(
            "  {} sprite frames scanned, {} indexed, {} aliases, {} scripts",
            self.frames_scanned, self.frames_indexed, self.aliases, self.scripts
        ));

        if !self.node_types.is_empty() {
            let total: usize = self.node_types.values().sum();
            lines.push(format!("  {} nodes of {} types classified", total, self.node_types.len()));
        }

        if !self.skipped.is_empty() {
            lines.push(format!("Skipped ({}): ", self.skipped.len()));
            for item in self.skipped.iter().take(5) {
                lines.push(format!("  - [{}] {}", item.kind, item.reason));
            }
            if self.skipped.len() > 5 {
                lines.push(format!("  ... and {} more", self.skipped.len() - 5));
            }
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report() {
        let report = ExtractReport::new();
        assert!(report.is_clean());
        assert_eq!(report.output_count(OutputKind::Sprite), 0);
        assert!(report.summary().starts_with("Extracted nothing from 0 resource files"));
    }

    #[test]
    fn test_output_counts() {
        let mut report = ExtractReport::new();
        report.record_output(OutputKind::Sprite, PathBuf::from("images/a.png"));
        report.record_output(OutputKind::Sprite, PathBuf::from("images/b.png"));
        report.record_output(OutputKind::Scene, PathBuf::from("out/Main.fire.json"));

        assert_eq!(report.output_count(OutputKind::Sprite), 2);
        assert_eq!(report.output_count(OutputKind::Scene), 1);
        assert_eq!(
            report.outputs_of(OutputKind::Scene),
            vec![&PathBuf::from("out/Main.fire.json")]
        );

        let summary = report.summary();
        assert!(summary.contains("1 scenes"));
        assert!(summary.contains("2 sprites"));
    }

    #[test]
    fn test_record_skip() {
        let mut report = ExtractReport::new();
        report.record_skip(&ExtractError::malformed("a.json", "missing '_name'"));

        assert!(!report.is_clean());
        assert_eq!(report.skipped[0].kind, "malformed");
        assert!(report.summary().contains("Skipped (1)"));
    }

    #[test]
    fn test_summary_truncates_skips() {
        let mut report = ExtractReport::new();
        for i in 0..8 {
            report.record_skip(&ExtractError::decode(format!("file {}", i), "bad"));
        }
        let summary = report.summary();
        assert!(summary.contains("... and 3 more"));
    }

    #[test]
    fn test_count_node_types() {
        let mut report = ExtractReport::new();
        report.count_node_type("cc.Node");
        report.count_node_type("cc.Node");
        report.count_node_type("cc.Label");
        assert_eq!(report.node_types["cc.Node"], 2);
        assert!(report.summary().contains("3 nodes of 2 types"));
    }
}
