//! Variant configuration.
//!
//! Without a variants file, four built-in variants are rendered. A variants
//! file replaces them with its own list:
//!
//! ```yaml
//! - id: base
//!   base_theme: base
//! - id: modern-gradient
//!   base_theme: base
//!   preset: modern-gradient
//! - id: plain
//!   base_theme: v2
//!   stamp_page_id: false
//! ```
//!
//! `preset` names a directory under the presets root; its `login`
//! subdirectory becomes the variant's preset overlay.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use kcpreview_render::source::LOGIN_DIR;
use kcpreview_render::Variant;
use serde::Deserialize;

/// Errors raised while reading the variant list.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read variants file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid variants file {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Variant {index} has an empty id")]
    EmptyId { index: usize },

    #[error("Duplicate variant id: {0}")]
    DuplicateId(String),
}

/// One entry of the variants file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariantEntry {
    pub id: String,
    pub base_theme: String,
    #[serde(default)]
    pub preset: Option<String>,
    #[serde(default = "default_stamp")]
    pub stamp_page_id: bool,
}

fn default_stamp() -> bool {
    true
}

impl VariantEntry {
    fn new(id: &str, base_theme: &str, preset: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            base_theme: base_theme.to_string(),
            preset: preset.map(str::to_string),
            stamp_page_id: true,
        }
    }

    /// Resolves the entry against the presets root.
    pub fn to_variant(&self, presets_root: &Path) -> Variant {
        let variant = Variant::new(self.id.trim(), self.base_theme.trim())
            .with_stamp_page_id(self.stamp_page_id);
        match &self.preset {
            Some(preset) => variant.with_preset(presets_root.join(preset).join(LOGIN_DIR)),
            None => variant,
        }
    }
}

/// The variants rendered when no variants file is given.
pub fn builtin_entries() -> Vec<VariantEntry> {
    vec![
        VariantEntry::new("base", "base", None),
        VariantEntry::new("v2", "v2", None),
        VariantEntry::new("modern-gradient", "base", Some("modern-gradient")),
        VariantEntry::new("horizontal-card", "base", Some("horizontal-card")),
    ]
}

/// Parses a variants file.
pub fn parse_entries(text: &str, path: &Path) -> Result<Vec<VariantEntry>, ConfigError> {
    let entries: Vec<VariantEntry> =
        serde_yaml::from_str(text).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
    validate(&entries)?;
    Ok(entries)
}

/// Reads and parses a variants file.
pub fn read_entries(path: &Path) -> Result<Vec<VariantEntry>, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_entries(&text, path)
}

fn validate(entries: &[VariantEntry]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for (position, entry) in entries.iter().enumerate() {
        let id = entry.id.trim();
        if id.is_empty() {
            return Err(ConfigError::EmptyId {
                index: position + 1,
            });
        }
        if !seen.insert(id) {
            return Err(ConfigError::DuplicateId(id.to_string()));
        }
    }
    Ok(())
}

/// The configured variants: the file's list when given, else the built-ins.
pub fn configured_variants(
    variants_file: Option<&Path>,
    presets_root: &Path,
) -> Result<Vec<Variant>, ConfigError> {
    let entries = match variants_file {
        Some(path) => read_entries(path)?,
        None => builtin_entries(),
    };
    Ok(entries
        .iter()
        .map(|entry| entry.to_variant(presets_root))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins() {
        let variants = configured_variants(None, Path::new("/presets")).unwrap();
        let ids: Vec<&str> = variants.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["base", "v2", "modern-gradient", "horizontal-card"]);

        assert_eq!(variants[1].base_theme, "v2");
        assert!(variants[0].preset_overlay.is_none());
        assert_eq!(
            variants[2].preset_overlay.as_deref(),
            Some(Path::new("/presets/modern-gradient/login"))
        );
        assert!(variants.iter().all(|v| v.stamp_page_id));
    }

    #[test]
    fn test_parse_file() {
        let entries = parse_entries(
            "- id: plain\n  base_theme: v2\n  stamp_page_id: false\n- id: fancy\n  base_theme: base\n  preset: fancy\n",
            Path::new("variants.yaml"),
        )
        .unwrap();
        assert_eq!(entries.len(), 2);
        assert!(!entries[0].stamp_page_id);
        assert!(entries[1].stamp_page_id);

        let variant = entries[1].to_variant(Path::new("presets"));
        assert_eq!(
            variant.preset_overlay,
            Some(PathBuf::from("presets/fancy/login"))
        );
    }

    #[test]
    fn test_empty_id_rejected() {
        let err = parse_entries("- id: ' '\n  base_theme: base\n", Path::new("v.yaml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::EmptyId { index: 1 }));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let err = parse_entries(
            "- id: a\n  base_theme: base\n- id: a\n  base_theme: v2\n",
            Path::new("v.yaml"),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Duplicate variant id: a");
    }

    #[test]
    fn test_bad_yaml_and_missing_file() {
        assert!(matches!(
            parse_entries("- id: a\n", Path::new("v.yaml")),
            Err(ConfigError::Yaml { .. })
        ));
        let temp = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_entries(&temp.path().join("missing.yaml")),
            Err(ConfigError::Io { .. })
        ));
    }
}
