//! The render driver: variant × page × scenario.
//!
//! [`RenderDriver::render_variant`] renders every page template of one
//! variant and folds the per-page results into a [`VariantOutcome`]. Nothing
//! in here fails the run: every render error becomes a [`Skip`] and the
//! driver moves on.
//!
//! # Per page
//!
//! 1. Resolve the default context (common + page). If that is empty and the
//!    page is not `login`, use the `login` context instead.
//! 2. Render the default markup. An error or blank output skips the page,
//!    including its scenarios.
//! 3. Produce scenarios from the configured [`ScenarioSource`]. Scenario
//!    markup identical to the default markup is dropped, except for the
//!    fallback copy that stands in for missing pre-rendered HTML.
//!
//! Each render builds its [`PageModel`] from a fresh copy of the context, so
//! nothing injected into one render is visible to the next.

use std::fmt;

use indexmap::IndexMap;
use tracing::debug;

use crate::context::PageModel;
use crate::error::{LoadError, RenderError};
use crate::fragment::Fragment;
use crate::overrides::{normalize_page_name, OverrideDocument};
use crate::postprocess::MarkupRewriter;
use crate::scenario::{load_scenario_html, ScenarioSource};
use crate::template::{MiniJinjaEngine, TemplateEngine};
use crate::variant::{Variant, VariantInputs};

/// Page whose context stands in for pages without mock data.
pub const LOGIN_PAGE: &str = "login";

/// Key of the default (non-scenario) markup of a page.
pub const DEFAULT_SCENARIO: &str = "default";

/// Default static asset prefix for `url.resourcesPath`.
pub const DEFAULT_RESOURCE_PREFIX: &str = "keycloak-dev-resources/themes";

const EMPTY_OUTPUT_REASON: &str = "renders empty output (macro-only template)";
const FALLBACK_SUFFIX: &str = " (falling back to rendered page HTML)";

/// One-line summary of a render failure.
pub fn summarize_error(err: &RenderError) -> String {
    err.summarize()
}

/// A render that produced no output, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skip {
    /// Template file name.
    pub template: String,
    pub scenario: Option<String>,
    pub reason: String,
}

impl Skip {
    pub fn page(template: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            scenario: None,
            reason: reason.into(),
        }
    }

    pub fn scenario(
        template: impl Into<String>,
        scenario: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            template: template.into(),
            scenario: Some(scenario.into()),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scenario {
            Some(scenario) => write!(f, "{} [{}]: {}", self.template, scenario, self.reason),
            None => write!(f, "{}: {}", self.template, self.reason),
        }
    }
}

/// Result of rendering one page template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageOutcome {
    /// `<page>.html`.
    pub page_id: String,
    /// Default markup, then inline scenarios. Empty when the page was skipped.
    pub rendered: IndexMap<String, String>,
    /// Pre-rendered scenario markup (external artifacts only).
    pub external: IndexMap<String, String>,
    pub skips: Vec<Skip>,
}

impl PageOutcome {
    fn new(page_id: String) -> Self {
        Self {
            page_id,
            ..Self::default()
        }
    }

    pub fn is_rendered(&self) -> bool {
        !self.rendered.is_empty()
    }
}

/// Result of rendering every page of one variant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantOutcome {
    pub variant_id: String,
    /// Page id to scenario id to markup.
    pub pages: IndexMap<String, IndexMap<String, String>>,
    /// Page id to scenario id to pre-rendered markup.
    pub scenarios: IndexMap<String, IndexMap<String, String>>,
    pub skips: Vec<Skip>,
}

impl VariantOutcome {
    pub fn new(variant_id: impl Into<String>) -> Self {
        Self {
            variant_id: variant_id.into(),
            ..Self::default()
        }
    }

    /// Folds one page into the variant.
    pub fn absorb(&mut self, page: PageOutcome) {
        self.skips.extend(page.skips);
        if !page.rendered.is_empty() {
            self.pages.insert(page.page_id.clone(), page.rendered);
        }
        if !page.external.is_empty() {
            self.scenarios.insert(page.page_id, page.external);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// Renders variants page by page.
#[derive(Debug, Clone)]
pub struct RenderDriver {
    resource_prefix: String,
    rewriter: MarkupRewriter,
}

impl RenderDriver {
    pub fn new(resource_prefix: impl Into<String>) -> Result<Self, LoadError> {
        Ok(Self {
            resource_prefix: resource_prefix.into(),
            rewriter: MarkupRewriter::new()?,
        })
    }

    /// Renders every page template of `variant`.
    pub fn render_variant(
        &self,
        variant: &Variant,
        inputs: &VariantInputs,
        overrides: &OverrideDocument,
        scenarios: &ScenarioSource,
    ) -> VariantOutcome {
        let chain = inputs.lookup_chain();
        debug!(variant = %variant.id, roots = ?chain.roots(), "template lookup chain");
        let engine = MiniJinjaEngine::new(chain);

        let mut outcome = VariantOutcome::new(&variant.id);
        for template in inputs.page_templates() {
            let page = self.render_page(&engine, variant, inputs, overrides, scenarios, template);
            outcome.absorb(page);
        }
        outcome
    }

    /// Renders one page template and its scenarios.
    pub fn render_page<E: TemplateEngine>(
        &self,
        engine: &E,
        variant: &Variant,
        inputs: &VariantInputs,
        overrides: &OverrideDocument,
        scenarios: &ScenarioSource,
        template: &str,
    ) -> PageOutcome {
        let page_name = normalize_page_name(template);
        let mut outcome = PageOutcome::new(format!("{}.html", page_name));
        let context = default_context(overrides, &page_name);

        let html = match self.render_one(engine, template, &outcome.page_id, variant, inputs, context.clone()) {
            Ok(html) if html.trim().is_empty() => {
                outcome.skips.push(Skip::page(template, EMPTY_OUTPUT_REASON));
                return outcome;
            }
            Ok(html) => html,
            Err(err) => {
                outcome.skips.push(Skip::page(template, summarize_error(&err)));
                return outcome;
            }
        };
        outcome.rendered.insert(DEFAULT_SCENARIO.to_string(), html.clone());

        match scenarios {
            ScenarioSource::InlineOverride => {
                for id in overrides.scenario_ids(&page_name) {
                    let scenario_context = overrides.resolve_scenario_context(&context, &page_name, &id);
                    match self.render_one(engine, template, &outcome.page_id, variant, inputs, scenario_context) {
                        Ok(markup) if markup.trim().is_empty() => {
                            outcome.skips.push(Skip::scenario(template, &id, EMPTY_OUTPUT_REASON));
                        }
                        Ok(markup) if markup == html => {
                            debug!(template, scenario = %id, "scenario identical to default, dropped");
                        }
                        Ok(markup) => {
                            outcome.rendered.insert(id, markup);
                        }
                        Err(err) => {
                            outcome.skips.push(Skip::scenario(template, &id, summarize_error(&err)));
                        }
                    }
                }
            }
            ScenarioSource::ExternalArtifact { manifests, html_root } => {
                for spec in manifests.get(&page_name).into_iter().flatten() {
                    let markup = match load_scenario_html(html_root, &variant.id, spec) {
                        Ok(markup) => {
                            let markup = self.rewriter.strip_scripts(&markup);
                            if markup == html {
                                debug!(template, scenario = %spec.id, "scenario identical to default, dropped");
                                continue;
                            }
                            markup
                        }
                        Err(err) => {
                            outcome.skips.push(Skip::scenario(
                                template,
                                &spec.id,
                                format!("{}{}", summarize_error(&err), FALLBACK_SUFFIX),
                            ));
                            html.clone()
                        }
                    };
                    outcome.external.insert(spec.id.clone(), markup);
                }
            }
        }
        outcome
    }

    fn render_one<E: TemplateEngine>(
        &self,
        engine: &E,
        template: &str,
        page_id: &str,
        variant: &Variant,
        inputs: &VariantInputs,
        context: Fragment,
    ) -> Result<String, RenderError> {
        let model = PageModel::build(context, page_id, &variant.id, inputs, &self.resource_prefix);
        let html = engine.render_named(template, &model)?;
        let page = page_id.trim_end_matches(".html");
        Ok(self.rewriter.apply(&html, page, variant.stamp_page_id))
    }
}

/// The page's resolved context, or the login page's when it is empty.
pub fn default_context(overrides: &OverrideDocument, page_name: &str) -> Fragment {
    let context = overrides.resolve_page_context(page_name);
    if context.is_empty() && page_name != LOGIN_PAGE {
        return overrides.resolve_page_context(LOGIN_PAGE);
    }
    context
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::ScenarioSpec;
    use serde_json::json;
    use std::fs;
    use std::path::{Path, PathBuf};

    struct Fixture {
        _temp: tempfile::TempDir,
        root: PathBuf,
        inputs: VariantInputs,
    }

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn fixture(templates: &[(&str, &str)]) -> Fixture {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path().to_path_buf();
        let login = root.join("upstream/base/login");
        write(&login.join("theme.properties"), "parent=\n");
        write(
            &root.join("upstream/base/messages/messages_en.properties"),
            "loginTitle=Sign in to {0}\n",
        );
        for (name, body) in templates {
            write(&login.join(name), body);
        }
        let inputs = VariantInputs::load(
            &root.join("upstream"),
            &root.join("overrides"),
            &Variant::new("base", "base"),
        )
        .unwrap()
        .unwrap();
        Fixture {
            _temp: temp,
            root,
            inputs,
        }
    }

    fn driver() -> RenderDriver {
        RenderDriver::new(DEFAULT_RESOURCE_PREFIX).unwrap()
    }

    fn doc(value: serde_json::Value) -> OverrideDocument {
        OverrideDocument::parse(&value.to_string()).unwrap()
    }

    #[test]
    fn test_skip_display() {
        assert_eq!(Skip::page("a.ftl", "boom").to_string(), "a.ftl: boom");
        assert_eq!(
            Skip::scenario("a.ftl", "dark", "boom").to_string(),
            "a.ftl [dark]: boom"
        );
    }

    #[test]
    fn test_default_context_falls_back_to_login() {
        let overrides = doc(json!({
            "pages": { "login": { "realm": { "name": "demo" } }, "info": { "x": 1 } }
        }));
        assert_eq!(
            serde_json::Value::Object(default_context(&overrides, "register")),
            json!({ "realm": { "name": "demo" } })
        );
        assert_eq!(
            serde_json::Value::Object(default_context(&overrides, "info")),
            json!({ "x": 1 })
        );
        assert!(default_context(&doc(json!({})), "login").is_empty());
    }

    #[test]
    fn test_render_variant_renders_and_stamps() {
        let f = fixture(&[(
            "login.ftl",
            "<body data-kc-x=\"1\">{{ msg('loginTitle', realm.name) }} {{ url.resourcesPath }}</body>",
        )]);
        let overrides = doc(json!({
            "common": { "url": {} },
            "pages": { "login": { "realm": { "name": "Demo" } } }
        }));

        let outcome = driver().render_variant(
            &Variant::new("base", "base"),
            &f.inputs,
            &overrides,
            &ScenarioSource::InlineOverride,
        );
        assert!(outcome.skips.is_empty(), "{:?}", outcome.skips);
        assert_eq!(
            outcome.pages["login.html"]["default"],
            "<body data-page-id=\"login-login\">Sign in to Demo /keycloak-dev-resources/themes/base/login/resources</body>"
        );
    }

    #[test]
    fn test_no_stamp_when_variant_disables_it() {
        let f = fixture(&[("login.ftl", "<body>x</body>")]);
        let variant = Variant::new("base", "base").with_stamp_page_id(false);
        let outcome = driver().render_variant(
            &variant,
            &f.inputs,
            &OverrideDocument::new(),
            &ScenarioSource::InlineOverride,
        );
        assert_eq!(outcome.pages["login.html"]["default"], "<body>x</body>");
    }

    #[test]
    fn test_failures_and_empty_output_become_skips() {
        let f = fixture(&[
            ("login.ftl", "<body>ok</body>"),
            ("broken.ftl", "{% if %}"),
            ("macros.ftl", "{% macro m() %}x{% endmacro %}\n"),
        ]);
        let outcome = driver().render_variant(
            &Variant::new("base", "base"),
            &f.inputs,
            &OverrideDocument::new(),
            &ScenarioSource::InlineOverride,
        );

        assert_eq!(outcome.pages.keys().collect::<Vec<_>>(), vec!["login.html"]);
        let reasons: Vec<String> = outcome.skips.iter().map(Skip::to_string).collect();
        assert_eq!(reasons.len(), 2);
        assert!(reasons[0].starts_with("broken.ftl: "));
        assert_eq!(reasons[1], "macros.ftl: renders empty output (macro-only template)");
    }

    #[test]
    fn test_inline_scenarios_merge_over_page_context() {
        let f = fixture(&[("login.ftl", "<p>{{ realm.name }}/{{ message.summary }}</p>")]);
        let overrides = doc(json!({
            "pages": {
                "login": { "realm": { "name": "Demo" } },
                "login@error": { "message": { "summary": "Bad password" } },
                "login@broken": { "realm": "flat" }
            }
        }));

        let outcome = driver().render_variant(
            &Variant::new("base", "base"),
            &f.inputs,
            &overrides,
            &ScenarioSource::InlineOverride,
        );
        let page = &outcome.pages["login.html"];
        assert_eq!(page["default"], "<p>Demo/</p>");
        assert_eq!(page["error"], "<p>Demo/Bad password</p>");
        assert_eq!(page["broken"], "<p>/</p>");
        assert!(outcome.scenarios.is_empty());
    }

    #[test]
    fn test_inline_scenarios_identical_to_default_are_dropped() {
        let f = fixture(&[("login.ftl", "<p>{{ realm.name }}</p><script>{{ message }}</script>")]);
        let overrides = doc(json!({
            "pages": {
                "login": { "realm": { "name": "Demo" } },
                "login@same": { "message": "only inside a script" },
                "login@other": { "realm": { "name": "Other" } }
            }
        }));

        let outcome = driver().render_variant(
            &Variant::new("base", "base").with_stamp_page_id(false),
            &f.inputs,
            &overrides,
            &ScenarioSource::InlineOverride,
        );
        let page = &outcome.pages["login.html"];
        assert_eq!(page.keys().collect::<Vec<_>>(), vec!["default", "other"]);
        assert_eq!(page["default"], "<p>Demo</p>");
        assert_eq!(page["other"], "<p>Other</p>");
        assert!(outcome.skips.is_empty());
    }

    #[test]
    fn test_external_scenarios_fall_back_to_default_markup() {
        let f = fixture(&[("login.ftl", "<p>default</p>")]);
        write(
            &f.root.join("html/base/login/error.html"),
            "<p>error</p><script>hydrate()</script>",
        );
        write(&f.root.join("html/base/login/same.html"), "<p>default</p>");
        let mut manifests = crate::scenario::ScenarioManifests::new();
        manifests.insert(
            "login".into(),
            vec![
                ScenarioSpec {
                    id: "error".into(),
                    html_file: "login/error.html".into(),
                },
                ScenarioSpec {
                    id: "missing".into(),
                    html_file: "login/missing.html".into(),
                },
                ScenarioSpec {
                    id: "same".into(),
                    html_file: "login/same.html".into(),
                },
            ],
        );
        let source = ScenarioSource::ExternalArtifact {
            manifests,
            html_root: f.root.join("html"),
        };

        let outcome = driver().render_variant(
            &Variant::new("base", "base").with_stamp_page_id(false),
            &f.inputs,
            &OverrideDocument::new(),
            &source,
        );
        let scenarios = &outcome.scenarios["login.html"];
        assert_eq!(scenarios["error"], "<p>error</p>");
        assert_eq!(scenarios["missing"], "<p>default</p>");
        assert!(!scenarios.contains_key("same"));
        assert_eq!(outcome.skips.len(), 1);
        let reason = outcome.skips[0].to_string();
        assert!(reason.starts_with("login.ftl [missing]: Missing pre-rendered scenario HTML"));
        assert!(reason.ends_with("(falling back to rendered page HTML)"));
    }

    #[test]
    fn test_renders_never_share_context() {
        let f = fixture(&[("login.ftl", "{{ url.resourcesPath }}")]);
        let overrides = doc(json!({ "common": { "url": { "loginAction": "#" } } }));
        let _ = driver().render_variant(
            &Variant::new("base", "base"),
            &f.inputs,
            &overrides,
            &ScenarioSource::InlineOverride,
        );
        assert_eq!(
            serde_json::Value::Object(overrides.common().clone()),
            json!({ "url": { "loginAction": "#" } })
        );
    }
}
