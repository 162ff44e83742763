//! Scenarios: named alternate states of a page.
//!
//! A scenario is produced one of two ways, selected per run by
//! [`ScenarioSource`]:
//!
//! - [`ScenarioSource::InlineOverride`]: every `"<page>@<id>"` key in the
//!   mock document is a scenario, rendered like the page itself with the
//!   scenario fragment merged over the page context.
//! - [`ScenarioSource::ExternalArtifact`]: scenarios are listed in
//!   `*.stories.json` manifests and their markup is read from pre-rendered
//!   HTML files. A missing file falls back to the page's default markup.
//!
//! # Manifest Format
//!
//! ```json
//! {
//!   "page": "login.ftl",
//!   "stories": [
//!     { "id": "error" },
//!     { "id": "otp", "htmlFile": "login/otp-variant.html" }
//!   ]
//! }
//! ```
//!
//! `page` is normalized like a mock page key. `htmlFile` defaults to
//! `<page>/<id>.html` and is resolved under `<html root>/<variant id>/`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::error::{LoadError, RenderError};
use crate::overrides::normalize_page_name;
use crate::template::is_contained;

/// Manifest file suffix.
pub const MANIFEST_SUFFIX: &str = ".stories.json";

/// One scenario declared in a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioSpec {
    pub id: String,
    /// Path of the pre-rendered markup, relative to the variant's HTML root.
    pub html_file: String,
}

/// Scenarios by normalized page name.
pub type ScenarioManifests = BTreeMap<String, Vec<ScenarioSpec>>;

/// Where scenario markup comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ScenarioSource {
    /// Scenarios are `"<page>@<id>"` keys in the mock document.
    #[default]
    InlineOverride,

    /// Scenarios are listed in manifests and read from pre-rendered files.
    ExternalArtifact {
        manifests: ScenarioManifests,
        html_root: PathBuf,
    },
}

impl ScenarioSource {
    /// Reads every manifest in `manifest_dir` and pairs them with `html_root`.
    pub fn external(manifest_dir: &Path, html_root: impl Into<PathBuf>) -> Result<Self, LoadError> {
        Ok(Self::ExternalArtifact {
            manifests: read_manifests(manifest_dir)?,
            html_root: html_root.into(),
        })
    }
}

/// Reads the pre-rendered markup of `spec` for `variant_id`.
///
/// The file must resolve below `html_root`.
pub fn load_scenario_html(
    html_root: &Path,
    variant_id: &str,
    spec: &ScenarioSpec,
) -> Result<String, RenderError> {
    if !is_contained(variant_id) || !is_contained(&spec.html_file) {
        return Err(RenderError::OperationError(format!(
            "Scenario HTML path escapes {}: {}/{}",
            html_root.display(),
            variant_id,
            spec.html_file
        )));
    }
    let path = html_root.join(variant_id).join(&spec.html_file);
    if !path.is_file() {
        return Err(RenderError::OperationError(format!(
            "Missing pre-rendered scenario HTML: {}",
            path.display()
        )));
    }
    Ok(std::fs::read_to_string(&path)?)
}

/// Reads all `*.stories.json` manifests directly inside `dir`, in path order.
///
/// An absent directory yields no scenarios. Manifests for the same page
/// accumulate.
pub fn read_manifests(dir: &Path) -> Result<ScenarioManifests, LoadError> {
    let mut manifests = ScenarioManifests::new();
    if !dir.is_dir() {
        return Ok(manifests);
    }

    let entries = std::fs::read_dir(dir).map_err(|e| LoadError::io(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| LoadError::io(dir, e))?.path();
        let is_manifest = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(MANIFEST_SUFFIX));
        if is_manifest && path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    for path in files {
        let text = std::fs::read_to_string(&path).map_err(|e| LoadError::io(&path, e))?;
        let (page, specs) = parse_manifest(&text, &path)?;
        debug!(page = %page, scenarios = specs.len(), path = %path.display(), "read scenario manifest");
        manifests.entry(page).or_default().extend(specs);
    }
    Ok(manifests)
}

/// Parses one manifest. `path` is only used in error messages.
pub fn parse_manifest(text: &str, path: &Path) -> Result<(String, Vec<ScenarioSpec>), LoadError> {
    let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
    let raw: Value = serde_json::from_str(text).map_err(|e| LoadError::json(path, e))?;

    let page = normalize_page_name(&text_of(raw.get("page")));
    if page.is_empty() {
        return Err(LoadError::ManifestMissingPage(path.to_path_buf()));
    }

    let Some(Value::Array(stories)) = raw.get("stories") else {
        return Err(LoadError::ManifestStoriesNotArray(path.to_path_buf()));
    };

    let mut specs = Vec::with_capacity(stories.len());
    for (position, story) in stories.iter().enumerate() {
        let id = text_of(story.get("id")).trim().to_string();
        if id.is_empty() {
            return Err(LoadError::ManifestStoryMissingId {
                index: position + 1,
                path: path.to_path_buf(),
            });
        }
        let html_file = match text_of(story.get("htmlFile")).trim() {
            "" => format!("{}/{}.html", page, id),
            given => given.to_string(),
        };
        specs.push(ScenarioSpec { id, html_file });
    }
    Ok((page, specs))
}

fn text_of(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}
