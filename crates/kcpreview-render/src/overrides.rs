//! Mock-context override documents.
//!
//! An override document supplies the data a page template is rendered
//! against. It has two parts:
//!
//! ```json
//! {
//!   "common": { "realm": { "displayName": "Demo" }, "url": { "loginAction": "#" } },
//!   "pages": {
//!     "login.ftl": { "realm": { "password": true } },
//!     "login@invalid-credentials": { "message": { "type": "error", "summary": "Invalid" } }
//!   }
//! }
//! ```
//!
//! Page keys are normalized on load (trimmed, one trailing template
//! extension removed), so `"login.ftl"` and `"login"` address the same page.
//! A key of the form `"<page>@<scenario>"` describes a named scenario of that
//! page; see [`OverrideDocument::scenario_ids`].
//!
//! # Resolution Order
//!
//! The context for a page is built fresh on every call, merging in
//! increasing precedence:
//!
//! 1. built-in `common`
//! 2. built-in page fragment
//! 3. custom `common`
//! 4. custom page fragment
//!
//! Steps 1/3 and 2/4 are combined up front by [`OverrideDocument::merge_custom`],
//! after which [`OverrideDocument::resolve_page_context`] only needs
//! common-then-page.

use std::path::Path;

use indexmap::IndexMap;

use crate::error::LoadError;
use crate::fragment::{as_fragment, deep_merge, Fragment};
use crate::source::TEMPLATE_EXTENSIONS;

/// Separator between a page name and a scenario id in a page key.
pub const SCENARIO_SEPARATOR: char = '@';

/// Normalizes a page name or page key.
///
/// Trims surrounding whitespace and strips one trailing template extension.
/// Case is preserved.
///
/// ```rust
/// use kcpreview_render::overrides::normalize_page_name;
///
/// assert_eq!(normalize_page_name("  login.ftl  "), "login");
/// assert_eq!(normalize_page_name("Register"), "Register");
/// assert_eq!(normalize_page_name(""), "");
/// ```
pub fn normalize_page_name(name: &str) -> String {
    let trimmed = name.trim();
    for ext in TEMPLATE_EXTENSIONS {
        if let Some(stem) = trimmed.strip_suffix(ext) {
            return stem.to_string();
        }
    }
    trimmed.to_string()
}

/// A `{ common, pages }` override document with normalized page keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverrideDocument {
    common: Fragment,
    pages: IndexMap<String, Fragment>,
}

impl OverrideDocument {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a document from parts, normalizing page keys.
    ///
    /// Keys that normalize to the empty string are discarded. When two raw
    /// keys normalize to the same name, the later one replaces the earlier.
    pub fn from_parts<I, K>(common: Fragment, pages: I) -> Self
    where
        I: IntoIterator<Item = (K, Fragment)>,
        K: AsRef<str>,
    {
        let mut normalized = IndexMap::new();
        for (key, fragment) in pages {
            let name = normalize_page_name(key.as_ref());
            if name.is_empty() {
                continue;
            }
            normalized.insert(name, fragment);
        }
        Self {
            common,
            pages: normalized,
        }
    }

    /// Loads a document from disk.
    ///
    /// A path that does not exist yields an empty document.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "override document absent, using empty mocks");
            return Ok(Self::new());
        }
        let text = std::fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
        Self::parse(&text).map_err(|e| LoadError::json(path, e))
    }

    /// Parses a document from JSON text.
    ///
    /// A leading byte-order mark is ignored. Non-object `common`/`pages`
    /// values, and non-object page fragments, are treated as empty.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
        let raw: Fragment = serde_json::from_str(text)?;
        let common = as_fragment(raw.get("common"));
        let raw_pages = as_fragment(raw.get("pages"));
        let pages = raw_pages
            .iter()
            .map(|(key, value)| (key.as_str(), as_fragment(Some(value))));
        Ok(Self::from_parts(common, pages))
    }

    /// The common fragment shared by every page.
    pub fn common(&self) -> &Fragment {
        &self.common
    }

    /// Page fragment for a normalized page key.
    pub fn page(&self, name: &str) -> Option<&Fragment> {
        self.pages.get(&normalize_page_name(name))
    }

    /// All normalized page keys, in document order.
    pub fn page_keys(&self) -> impl Iterator<Item = &str> {
        self.pages.keys().map(String::as_str)
    }

    /// Returns true if the document carries no data at all.
    pub fn is_empty(&self) -> bool {
        self.common.is_empty() && self.pages.is_empty()
    }

    /// Layers a custom document over a built-in one.
    ///
    /// Common fragments are deep-merged. Pages are unioned by normalized
    /// key; pages on both sides are deep-merged, pages on one side are
    /// copied. Neither input is modified.
    pub fn merge_custom(builtin: &OverrideDocument, custom: &OverrideDocument) -> OverrideDocument {
        let mut common = builtin.common.clone();
        deep_merge(&mut common, &custom.common);

        let mut pages = builtin.pages.clone();
        for (name, fragment) in &custom.pages {
            match pages.get_mut(name) {
                Some(target) => deep_merge(target, fragment),
                None => {
                    pages.insert(name.clone(), fragment.clone());
                }
            }
        }

        OverrideDocument { common, pages }
    }

    /// Resolves the merged context for one page key.
    ///
    /// Always returns a fresh fragment: common first, then the page fragment
    /// on top when it exists and is non-empty.
    pub fn resolve_page_context(&self, page_name: &str) -> Fragment {
        let mut merged = self.common.clone();
        if let Some(page) = self.page(page_name) {
            if !page.is_empty() {
                deep_merge(&mut merged, page);
            }
        }
        merged
    }

    /// Scenario ids declared for `page_name` through `"<page>@<id>"` keys.
    ///
    /// Ids are returned in document order; keys with an empty id are ignored.
    pub fn scenario_ids(&self, page_name: &str) -> Vec<String> {
        let prefix = format!("{}{}", normalize_page_name(page_name), SCENARIO_SEPARATOR);
        let mut ids: Vec<String> = Vec::new();
        for key in self.pages.keys() {
            let Some(id) = key.strip_prefix(&prefix) else {
                continue;
            };
            if id.is_empty() || ids.iter().any(|existing| existing == id) {
                continue;
            }
            ids.push(id.to_string());
        }
        ids
    }

    /// Resolves a scenario context on top of an already resolved page context.
    ///
    /// The result is `base` (common and page, already merged) with the
    /// `"<page>@<scenario>"` fragment merged over it.
    pub fn resolve_scenario_context(&self, base: &Fragment, page_name: &str, scenario: &str) -> Fragment {
        let key = scenario_key(page_name, scenario);
        let mut merged = base.clone();
        if let Some(fragment) = self.pages.get(&key) {
            deep_merge(&mut merged, fragment);
        }
        merged
    }
}

/// Builds the page key for a scenario of a page.
pub fn scenario_key(page_name: &str, scenario: &str) -> String {
    format!(
        "{}{}{}",
        normalize_page_name(page_name),
        SCENARIO_SEPARATOR,
        scenario
    )
}
