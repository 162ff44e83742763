//! Markup post-processing applied to every rendered page.
//!
//! Three rewrites, in order:
//!
//! 1. Scripts: `<script>...</script>` blocks are removed. Previews are
//!    static markup.
//! 2. Editor markers: attributes named `data-kc-*` or `data-editor-*` with a
//!    single- or double-quoted value are removed. They exist for the visual
//!    editor only.
//! 3. Page id stamping (per variant): the first `<body>` tag gets exactly one
//!    `data-page-id="login-<page>"` attribute. Existing `data-page-id`
//!    attributes on that tag are removed first. The tag keeps its own case.
//!
//! ```rust
//! use kcpreview_render::postprocess::MarkupRewriter;
//!
//! let rewriter = MarkupRewriter::new().unwrap();
//! let html = rewriter.strip_editor_markers(r#"<div data-kc-role="x" class="a">"#);
//! assert_eq!(html, r#"<div class="a">"#);
//!
//! let html = rewriter.stamp_page_id(r#"<body data-page-id="old">"#, "login");
//! assert_eq!(html, r#"<body data-page-id="login-login">"#);
//! ```

use regex::{Captures, Regex};

/// Prefix of the stamped page id value.
pub const PAGE_ID_PREFIX: &str = "login-";

const SCRIPT_BLOCK_PATTERN: &str = r"(?is)<script\b.*?</script\s*>";
const EDITOR_MARKER_PATTERN: &str = r#"\sdata-(?:kc|editor)-[\w-]+=("[^"]*"|'[^']*')"#;
const BODY_TAG_PATTERN: &str = r"(?i)(<body\b)([^>]*)>";
const PAGE_ID_ATTR_PATTERN: &str = r#"(?i)\sdata-page-id\s*=\s*("[^"]*"|'[^']*'|[^\s"'>]+)"#;

/// Compiled rewrites for rendered markup.
#[derive(Debug, Clone)]
pub struct MarkupRewriter {
    script_blocks: Regex,
    editor_markers: Regex,
    body_tag: Regex,
    page_id_attr: Regex,
}

impl MarkupRewriter {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            script_blocks: Regex::new(SCRIPT_BLOCK_PATTERN)?,
            editor_markers: Regex::new(EDITOR_MARKER_PATTERN)?,
            body_tag: Regex::new(BODY_TAG_PATTERN)?,
            page_id_attr: Regex::new(PAGE_ID_ATTR_PATTERN)?,
        })
    }

    /// Removes script blocks.
    pub fn strip_scripts(&self, html: &str) -> String {
        self.script_blocks.replace_all(html, "").into_owned()
    }

    /// Removes editor-only attributes.
    pub fn strip_editor_markers(&self, html: &str) -> String {
        self.editor_markers.replace_all(html, "").into_owned()
    }

    /// Sets `data-page-id` on the first body tag. Markup without a body tag
    /// is returned unchanged.
    pub fn stamp_page_id(&self, html: &str, page: &str) -> String {
        self.body_tag
            .replacen(html, 1, |caps: &Captures<'_>| {
                let open = caps.get(1).map_or("<body", |m| m.as_str());
                let attrs = caps.get(2).map_or("", |m| m.as_str());
                let cleaned = self.page_id_attr.replace_all(attrs, "");
                format!(
                    "{}{} data-page-id=\"{}{}\">",
                    open,
                    cleaned.trim_end(),
                    PAGE_ID_PREFIX,
                    page
                )
            })
            .into_owned()
    }

    /// All rewrites; stamping only when `stamp` is set.
    pub fn apply(&self, html: &str, page: &str, stamp: bool) -> String {
        let stripped = self.strip_editor_markers(&self.strip_scripts(html));
        if stamp {
            self.stamp_page_id(&stripped, page)
        } else {
            stripped
        }
    }
}
