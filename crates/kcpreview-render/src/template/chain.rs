//! Ordered template lookup roots.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Directories a template name is resolved against, most specific first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupChain {
    roots: Vec<PathBuf>,
}

impl LookupChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a root unconditionally.
    pub fn push(&mut self, root: impl Into<PathBuf>) {
        self.roots.push(root.into());
    }

    /// Appends `root` if it is an existing directory. Returns true if added.
    pub fn push_if_exists(&mut self, root: &Path) -> bool {
        if !root.is_dir() {
            return false;
        }
        self.roots.push(root.to_path_buf());
        true
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Path of the first file named `name` under any root.
    ///
    /// Absolute names and names that step outside a root never resolve.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        if !is_contained(name) {
            return None;
        }
        self.roots
            .iter()
            .map(|root| root.join(name))
            .find(|candidate| candidate.is_file())
    }

    /// Reads the first match for `name`; `Ok(None)` when nothing matches.
    pub fn load(&self, name: &str) -> io::Result<Option<String>> {
        match self.resolve(name) {
            Some(path) => std::fs::read_to_string(path).map(Some),
            None => Ok(None),
        }
    }
}

/// True for a non-empty relative path that stays below its root.
pub(crate) fn is_contained(name: &str) -> bool {
    if name.is_empty() {
        return false;
    }
    Path::new(name)
        .components()
        .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_first_root_wins() {
        let temp = tempfile::tempdir().unwrap();
        let overlay = temp.path().join("overlay");
        let base = temp.path().join("base");
        fs::create_dir_all(&overlay).unwrap();
        fs::create_dir_all(&base).unwrap();
        fs::write(overlay.join("login.ftl"), "overlay").unwrap();
        fs::write(base.join("login.ftl"), "base").unwrap();
        fs::write(base.join("template.ftl"), "layout").unwrap();

        let mut chain = LookupChain::new();
        chain.push(&overlay);
        chain.push(&base);

        assert_eq!(chain.load("login.ftl").unwrap().as_deref(), Some("overlay"));
        assert_eq!(chain.load("template.ftl").unwrap().as_deref(), Some("layout"));
        assert_eq!(chain.load("missing.ftl").unwrap(), None);
    }

    #[test]
    fn test_push_if_exists() {
        let temp = tempfile::tempdir().unwrap();
        let mut chain = LookupChain::new();
        assert!(chain.push_if_exists(temp.path()));
        assert!(!chain.push_if_exists(&temp.path().join("absent")));
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn test_escaping_names_never_resolve() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path().join("root");
        fs::create_dir_all(&root).unwrap();
        fs::write(temp.path().join("secret.ftl"), "secret").unwrap();

        let mut chain = LookupChain::new();
        chain.push(&root);
        assert_eq!(chain.resolve("../secret.ftl"), None);
        assert_eq!(
            chain.resolve(&temp.path().join("secret.ftl").to_string_lossy()),
            None
        );
        assert_eq!(chain.resolve(""), None);
    }

    #[test]
    fn test_nested_names_resolve() {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir_all(temp.path().join("partials")).unwrap();
        fs::write(temp.path().join("partials/header.ftl"), "h").unwrap();

        let mut chain = LookupChain::new();
        chain.push(temp.path());
        assert_eq!(
            chain.resolve("partials/header.ftl"),
            Some(temp.path().join("partials/header.ftl"))
        );
    }
}
