//! The aggregate preview artifact.
//!
//! One JSON document collects the markup of every variant:
//!
//! ```json
//! {
//!   "generatedAt": "2026-01-01T00:00:00Z",
//!   "keycloakTag": "26.x",
//!   "variants": {
//!     "base": { "login.html": { "default": "<html>…", "error": "<html>…" } }
//!   },
//!   "scenarios": {
//!     "base": { "login.html": { "otp": "<html>…" } }
//!   }
//! }
//! ```
//!
//! `scenarios` holds pre-rendered scenario markup and is omitted when there
//! is none. Variants that rendered no page are left out entirely.

use std::path::Path;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{info, warn};

use crate::driver::{Skip, VariantOutcome};
use crate::error::LoadError;

/// File name of the artifact inside the output directory.
pub const ARTIFACT_FILE_NAME: &str = "pages.json";

/// Number of skip diagnostics listed per variant.
pub const SKIP_SAMPLE_SIZE: usize = 3;

/// Scenario id to markup.
pub type PageMarkup = IndexMap<String, String>;

/// Page id to scenario markup.
pub type VariantMarkup = IndexMap<String, PageMarkup>;

/// The document written to `pages.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewArtifact {
    pub generated_at: DateTime<Utc>,
    pub keycloak_tag: String,
    pub variants: IndexMap<String, VariantMarkup>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub scenarios: IndexMap<String, VariantMarkup>,
}

impl PreviewArtifact {
    /// An empty artifact stamped with the current time.
    pub fn new(keycloak_tag: impl Into<String>) -> Self {
        Self::with_timestamp(keycloak_tag, Utc::now())
    }

    pub fn with_timestamp(keycloak_tag: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            generated_at: at,
            keycloak_tag: keycloak_tag.into(),
            variants: IndexMap::new(),
            scenarios: IndexMap::new(),
        }
    }

    /// Adds a rendered variant. Variants without pages are dropped.
    pub fn add_variant(&mut self, outcome: VariantOutcome) {
        if !outcome.scenarios.is_empty() {
            self.scenarios
                .insert(outcome.variant_id.clone(), outcome.scenarios);
        }
        if !outcome.pages.is_empty() {
            self.variants.insert(outcome.variant_id, outcome.pages);
        }
    }

    /// Pretty JSON with a trailing newline.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    /// Writes the artifact to `path`, creating parent directories.
    pub fn write(&self, path: &Path) -> Result<(), LoadError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| LoadError::io(parent, e))?;
        }
        let json = self.to_json().map_err(|e| LoadError::json(path, e))?;
        std::fs::write(path, json).map_err(|e| LoadError::io(path, e))?;
        info!(path = %path.display(), variants = self.variants.len(), "wrote preview artifact");
        Ok(())
    }
}

/// Human-readable skip summary for one variant: a header, up to
/// [`SKIP_SAMPLE_SIZE`] diagnostics, then a count of the rest.
pub fn skip_report(variant_id: &str, skips: &[Skip]) -> Vec<String> {
    if skips.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![format!(
        "Skipped {} template(s) for variant {} due to unsupported preview context.",
        skips.len(),
        variant_id
    )];
    lines.extend(
        skips
            .iter()
            .take(SKIP_SAMPLE_SIZE)
            .map(|skip| format!("  - {}", skip)),
    );
    if skips.len() > SKIP_SAMPLE_SIZE {
        lines.push(format!("  - ... and {} more", skips.len() - SKIP_SAMPLE_SIZE));
    }
    lines
}

/// Logs [`skip_report`] at warn level.
pub fn log_skips(variant_id: &str, skips: &[Skip]) {
    for line in skip_report(variant_id, skips) {
        warn!("{}", line);
    }
}
