//! User theme discovery.
//!
//! Any directory under the search root holding `login/theme.properties`
//! is a user theme and becomes an extra variant, layered over the upstream
//! theme its `parent` property points at.

use std::path::{Path, PathBuf};

use kcpreview_render::source::{LOGIN_DIR, THEME_PROPERTIES_FILE};
use kcpreview_render::{LoadError, PropertyTable, Variant};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Directory levels searched below the root (the root is level 0).
pub const MAX_DISCOVERY_DEPTH: usize = 4;

/// Directory names never descended into.
pub const SKIP_DIRS: &[&str] = &["node_modules", "dist", "build", "target", ".next", ".nuxt"];

/// A discovered user theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserTheme {
    pub id: String,
    pub dir: PathBuf,
    pub base_theme: String,
}

impl UserTheme {
    /// Reads the theme descriptor of the theme rooted at `dir`.
    pub fn load(dir: &Path) -> Result<Option<Self>, LoadError> {
        let Some(id) = dir.file_name().and_then(|n| n.to_str()) else {
            warn!("Skipping user theme at {}: no usable directory name", dir.display());
            return Ok(None);
        };
        let properties = PropertyTable::read(&descriptor_path(dir))?;
        let base_theme = match properties.get("parent") {
            Some(parent) if parent.trim().ends_with("v2") => "v2",
            _ => "base",
        };
        Ok(Some(Self {
            id: id.to_string(),
            dir: dir.to_path_buf(),
            base_theme: base_theme.to_string(),
        }))
    }

    pub fn login_dir(&self) -> PathBuf {
        self.dir.join(LOGIN_DIR)
    }

    pub fn to_variant(&self) -> Variant {
        Variant::new(&self.id, &self.base_theme).with_user_overlay(self.login_dir())
    }
}

fn descriptor_path(dir: &Path) -> PathBuf {
    dir.join(LOGIN_DIR).join(THEME_PROPERTIES_FILE)
}

fn is_skipped(entry: &DirEntry) -> bool {
    if entry.depth() == 0 {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || SKIP_DIRS.contains(&name.as_ref())
}

/// Finds theme directories under `root`, in sorted walk order.
///
/// The root is canonicalized first so `.` or `..` roots still carry a
/// directory name.
pub fn find_theme_dirs(root: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let root = std::fs::canonicalize(root).map_err(|e| LoadError::io(root, e))?;
    let dirs = WalkDir::new(&root)
        .max_depth(MAX_DISCOVERY_DEPTH)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.file_type().is_dir() && !is_skipped(entry))
        .filter_map(Result::ok)
        .filter(|entry| descriptor_path(entry.path()).is_file())
        .map(DirEntry::into_path)
        .collect();
    Ok(dirs)
}

/// Discovers user themes and appends them to `variants`.
///
/// A theme whose id is already taken is skipped with a warning.
pub fn append_user_themes(root: &Path, variants: &mut Vec<Variant>) -> Result<(), LoadError> {
    for dir in find_theme_dirs(root)? {
        let Some(theme) = UserTheme::load(&dir)? else {
            continue;
        };
        if variants.iter().any(|v| v.id == theme.id) {
            warn!(
                "Skipping user theme {} at {}: variant id already in use",
                theme.id,
                dir.display()
            );
            continue;
        }
        debug!(id = %theme.id, base_theme = %theme.base_theme, dir = %dir.display(), "discovered user theme");
        variants.push(theme.to_variant());
    }
    Ok(())
}
