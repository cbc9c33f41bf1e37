//! Build manifest resolver
//!
//! The bundled project script registers every script module with a call of
//! the form `cc._RF.push(e, "<uuid>", "<name>")`. Only the first two quoted
//! arguments are read; they become the identifier -> script name table.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::error::ExtractError;
use crate::scanner::strip_whitespace;

/// Matches a registration call once whitespace has been stripped.
fn push_call_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"cc\._RF\.push\(e,"([^"]*)","([^"]*)""#).expect("static pattern is valid")
    })
}

/// Identifier -> script name table, read-only once built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ScriptTable {
    entries: BTreeMap<String, String>,
}

impl ScriptTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse manifest text. Calls that do not carry two quoted arguments are ignored.
    pub fn parse(bytes: &[u8]) -> Self {
        let stripped = strip_whitespace(bytes);
        let text = String::from_utf8_lossy(&stripped);

        let mut table = Self::new();
        for captures in push_call_pattern().captures_iter(&text) {
            table.entries.insert(captures[1].to_string(), captures[2].to_string());
        }
        table
    }

    /// Read and parse a manifest file.
    pub fn load(path: &Path) -> Result<Self, ExtractError> {
        let bytes = std::fs::read(path)
            .map_err(|source| ExtractError::Io { path: path.to_path_buf(), source })?;
        Ok(Self::parse(&bytes))
    }

    pub fn get(&self, uuid: &str) -> Option<&str> {
        self.entries.get(uuid).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_entry() {
        let table = ScriptTable::parse(br#"cc._RF.push(e, "abc-123", "MyScript")"#);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("abc-123"), Some("MyScript"));
    }

    #[test]
    fn test_bundle_with_malformed_lines() {
        let manifest = br#"
            window.__require = function e(t, n, r) {};
            cc._RF.push(e, "b5a3dRXqTtHuZSeA5eq6Ojd", "Game");
            cc._RF.push(e);
            cc._RF.push(e, "only-one");
            cc._RF.pop();
            cc._RF.push(e, "7c2a1QbZ9tPt4", "Player"
            );
        "#;
        let table = ScriptTable::parse(manifest);

        assert_eq!(table.len(), 2);
        assert_eq!(table.get("b5a3dRXqTtHuZSeA5eq6Ojd"), Some("Game"));
        assert_eq!(table.get("7c2a1QbZ9tPt4"), Some("Player"));
        assert_eq!(table.get("only-one"), None);
    }

    #[test]
    fn test_later_registration_overwrites() {
        let table = ScriptTable::parse(br#"cc._RF.push(e,"id","Old");cc._RF.push(e,"id","New")"#);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("id"), Some("New"));
    }

    #[test]
    fn test_iter_sorted() {
        let table = ScriptTable::parse(br#"cc._RF.push(e,"b","B");cc._RF.push(e,"a","A")"#);
        let keys: Vec<_> = table.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_empty_manifest() {
        assert!(ScriptTable::parse(b"").is_empty());
    }

    #[test]
    fn test_serializes_as_map() {
        let table = ScriptTable::parse(br#"cc._RF.push(e,"u","Name")"#);
        assert_eq!(serde_json::to_string(&table).unwrap(), r#"{"u":"Name"}"#);
    }

    #[test]
    fn test_load_missing_file() {
        let err = ScriptTable::load(Path::new("/nonexistent/project.js")).unwrap_err();
        assert_eq!(err.kind(), "io");
    }
}
