//! Template sources: one physical theme directory each.
//!
//! A [`TemplateSource`] is anything that can list page templates and supply
//! a theme descriptor and a message bundle. Missing directories and missing
//! files are reported as absent (`None` / empty list), never as errors, so
//! callers express precedence purely by the order in which they consult
//! sources.
//!
//! # Layouts
//!
//! [`ThemeDir`] covers the two directory layouts in use:
//!
//! | Layout | Templates | Descriptor | Messages |
//! |--------|-----------|------------|----------|
//! | upstream | `<input>/<theme>/login/` | `<input>/<theme>/login/theme.properties` | `<input>/<theme>/messages/messages_en.properties` |
//! | overlay | `<dir>/` | `<dir>/theme.properties` | `<dir>/messages/messages_en.properties` |
//!
//! # Recognized Templates
//!
//! Template files are recognized by extension, in priority order:
//!
//! | Priority | Extension |
//! |----------|-----------|
//! | 1 (highest) | `.ftl` |
//! | 2 | `.jinja` |
//!
//! Layout and partial templates ([`EXCLUDED_TEMPLATES`]) are never listed as
//! pages, although they stay resolvable through the lookup chain.

use std::fmt::Debug;
use std::path::{Path, PathBuf};

use crate::error::LoadError;
use crate::properties::PropertyTable;

/// Recognized template file extensions in priority order.
pub const TEMPLATE_EXTENSIONS: &[&str] = &[".ftl", ".jinja"];

/// Template stems that are layouts or partials rather than pages.
pub const EXCLUDED_TEMPLATES: &[&str] = &["template", "footer", "field", "passkeys", "cli_splash"];

/// Theme descriptor file name.
pub const THEME_PROPERTIES_FILE: &str = "theme.properties";

/// Message bundle file name (inside a `messages/` directory).
pub const MESSAGES_FILE: &str = "messages_en.properties";

/// Page templates live under this directory of an upstream theme.
pub const LOGIN_DIR: &str = "login";

/// Splits a template file name into its stem and extension priority.
///
/// Returns `None` for files without a recognized template extension.
pub fn split_template_name(file_name: &str) -> Option<(&str, usize)> {
    TEMPLATE_EXTENSIONS
        .iter()
        .enumerate()
        .find_map(|(priority, ext)| file_name.strip_suffix(ext).map(|stem| (stem, priority)))
        .filter(|(stem, _)| !stem.is_empty())
}

/// Returns true if `file_name` is a page template (recognized, not excluded).
pub fn is_page_template(file_name: &str) -> bool {
    match split_template_name(file_name) {
        Some((stem, _)) => !EXCLUDED_TEMPLATES.contains(&stem),
        None => false,
    }
}

/// A directory that can supply page templates, properties and messages.
pub trait TemplateSource: Debug {
    /// The directory templates are resolved against.
    fn root(&self) -> &Path;

    /// Whether the template directory exists.
    fn exists(&self) -> bool {
        self.root().is_dir()
    }

    /// Page template file names directly inside [`root`](Self::root), sorted.
    ///
    /// Empty when the directory does not exist.
    fn list_pages(&self) -> Result<Vec<String>, LoadError>;

    /// The theme descriptor, if present.
    fn read_properties(&self) -> Result<Option<PropertyTable>, LoadError>;

    /// The English message bundle, if present.
    fn read_messages(&self) -> Result<Option<PropertyTable>, LoadError>;
}

/// A theme directory on the local filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeDir {
    templates: PathBuf,
    properties: PathBuf,
    messages: PathBuf,
}

impl ThemeDir {
    /// A self-contained overlay directory (preset, local override, user theme).
    pub fn overlay(dir: impl Into<PathBuf>) -> Self {
        let templates = dir.into();
        Self {
            properties: templates.join(THEME_PROPERTIES_FILE),
            messages: templates.join("messages").join(MESSAGES_FILE),
            templates,
        }
    }

    /// A theme inside the upstream input tree.
    pub fn upstream(input_root: &Path, theme: &str) -> Self {
        let theme_root = input_root.join(theme);
        let templates = theme_root.join(LOGIN_DIR);
        Self {
            properties: templates.join(THEME_PROPERTIES_FILE),
            messages: theme_root.join("messages").join(MESSAGES_FILE),
            templates,
        }
    }

    /// Path of the theme descriptor.
    pub fn properties_path(&self) -> &Path {
        &self.properties
    }

    /// Path of the message bundle.
    pub fn messages_path(&self) -> &Path {
        &self.messages
    }
}

fn read_optional(path: &Path) -> Result<Option<PropertyTable>, LoadError> {
    if !path.is_file() {
        return Ok(None);
    }
    PropertyTable::read(path).map(Some)
}

impl TemplateSource for ThemeDir {
    fn root(&self) -> &Path {
        &self.templates
    }

    fn list_pages(&self) -> Result<Vec<String>, LoadError> {
        if !self.templates.is_dir() {
            return Ok(Vec::new());
        }
        let entries =
            std::fs::read_dir(&self.templates).map_err(|e| LoadError::io(&self.templates, e))?;

        let mut pages = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| LoadError::io(&self.templates, e))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if is_page_template(name) {
                pages.push(name.to_string());
            }
        }
        pages.sort();
        Ok(pages)
    }

    fn read_properties(&self) -> Result<Option<PropertyTable>, LoadError> {
        read_optional(&self.properties)
    }

    fn read_messages(&self) -> Result<Option<PropertyTable>, LoadError> {
        read_optional(&self.messages)
    }
}
