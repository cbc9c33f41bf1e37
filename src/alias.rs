//! Sprite alias table
//!
//! Sprite atlas nodes list their frames as `{"<sprite name>": {"__uuid__": "<id>"}}`.
//! The table maps each referenced identifier back to the sprite name it was
//! listed under. Entries are only ever inserted or overwritten.

use std::collections::BTreeMap;

use serde::Serialize;

/// Identifier -> sprite name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AliasTable {
    entries: BTreeMap<String, String>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `uuid -> sprite_name`, returning the name it replaced.
    pub fn insert(
        &mut self,
        uuid: impl Into<String>,
        sprite_name: impl Into<String>,
    ) -> Option<String> {
        self.entries.insert(uuid.into(), sprite_name.into())
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

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
