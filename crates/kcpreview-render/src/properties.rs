//! `key=value` property tables.
//!
//! Theme descriptors (`theme.properties`) and message bundles
//! (`messages_en.properties`) share one deliberately lenient format:
//!
//! - Lines split on any line terminator.
//! - Blank lines and lines starting with `#` (after trimming) are ignored.
//! - A line is a pair only if it contains `=` past its first character. The
//!   key is the trimmed text before the first `=`, the value the trimmed rest.
//! - A repeated key overwrites the earlier value.
//!
//! There is no escaping, no continuation lines and no typing. Malformed lines
//! are dropped silently.

use std::path::Path;

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::LoadError;

/// Line terminators recognized by [`PropertyTable::parse`].
const LINE_TERMINATORS: [char; 7] = [
    '\n', '\r', '\u{0B}', '\u{0C}', '\u{85}', '\u{2028}', '\u{2029}',
];

/// An insertion-ordered string table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PropertyTable {
    entries: IndexMap<String, String>,
}

impl PropertyTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses property text. Never fails.
    pub fn parse(text: &str) -> Self {
        let mut table = Self::new();
        for raw_line in text.split(LINE_TERMINATORS) {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some(index) = line.find('=') else {
                continue;
            };
            if index == 0 {
                continue;
            }
            let key = line[..index].trim();
            let value = line[index + 1..].trim();
            table.insert(key, value);
        }
        table
    }

    /// Reads and parses a UTF-8 property file.
    pub fn read(path: &Path) -> Result<Self, LoadError> {
        let text = std::fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
        Ok(Self::parse(&text))
    }

    /// Looks up a value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Returns true if `key` is defined.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Sets `key`, replacing any previous value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Sets `key` only if it is not defined yet. Returns true if inserted.
    pub fn insert_if_absent(&mut self, key: &str, value: &str) -> bool {
        if self.entries.contains_key(key) {
            return false;
        }
        self.entries.insert(key.to_string(), value.to_string());
        true
    }

    /// Adds every key of `other` that is not defined yet (first definition wins).
    pub fn extend_missing(&mut self, other: &PropertyTable) {
        for (key, value) in &other.entries {
            self.insert_if_absent(key, value);
        }
    }

    /// Copies every key of `other`, replacing existing values (last definition wins).
    pub fn extend_overwrite(&mut self, other: &PropertyTable) {
        for (key, value) in &other.entries {
            self.entries.insert(key.clone(), value.clone());
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PropertyTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (key, value) in iter {
            table.insert(key, value);
        }
        table
    }
}
