//! Theme variants and their resolved inputs.
//!
//! A [`Variant`] names a base theme and the optional overlay directories
//! layered on top of it. [`VariantInputs::load`] turns that description into
//! everything a render needs: the template lookup chain, merged theme
//! properties, merged messages and the list of page templates.
//!
//! # Layers
//!
//! Five candidate sources, most specific first:
//!
//! | Layer | Directory |
//! |-------|-----------|
//! | user overlay | `<user theme>/login` |
//! | preset overlay | `<presets>/<preset>/login` |
//! | local override | `<overrides>/<base theme>/login` |
//! | base theme | `<input>/<base theme>/login` |
//! | inherited base | `<input>/base/login` |
//!
//! Properties are layered first-definition-wins starting at the base theme,
//! messages last-definition-wins. Both walk the overlays in the order local
//! override, preset overlay, user overlay.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::LoadError;
use crate::properties::PropertyTable;
use crate::source::{split_template_name, TemplateSource, ThemeDir, LOGIN_DIR};
use crate::template::LookupChain;

/// Theme every variant inherits templates from.
pub const INHERITED_BASE_THEME: &str = "base";

/// One configured theme flavor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    /// Identifier used in the output artifact and resource paths.
    pub id: String,
    /// Upstream theme supplying templates, properties and messages.
    pub base_theme: String,
    /// Preset directory layered over the base theme.
    pub preset_overlay: Option<PathBuf>,
    /// User theme directory layered over everything else.
    pub user_overlay: Option<PathBuf>,
    /// Whether rendered markup gets a `data-page-id` on its body tag.
    pub stamp_page_id: bool,
}

impl Variant {
    /// A variant with no overlays that stamps page ids.
    pub fn new(id: impl Into<String>, base_theme: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            base_theme: base_theme.into(),
            preset_overlay: None,
            user_overlay: None,
            stamp_page_id: true,
        }
    }

    pub fn with_preset(mut self, dir: impl Into<PathBuf>) -> Self {
        self.preset_overlay = Some(dir.into());
        self
    }

    pub fn with_user_overlay(mut self, dir: impl Into<PathBuf>) -> Self {
        self.user_overlay = Some(dir.into());
        self
    }

    pub fn with_stamp_page_id(mut self, stamp: bool) -> Self {
        self.stamp_page_id = stamp;
        self
    }
}

/// Fully loaded inputs for one variant.
#[derive(Debug, Clone)]
pub struct VariantInputs {
    user_overlay: Option<ThemeDir>,
    preset_overlay: Option<ThemeDir>,
    local_override: ThemeDir,
    base: ThemeDir,
    inherited: ThemeDir,
    properties: PropertyTable,
    messages: PropertyTable,
    page_templates: Vec<String>,
}

impl VariantInputs {
    /// Resolves and loads the inputs of `variant`.
    ///
    /// Returns `Ok(None)` when the base theme's page directory, descriptor or
    /// message bundle is missing: such a variant contributes nothing.
    pub fn load(
        input_root: &Path,
        override_root: &Path,
        variant: &Variant,
    ) -> Result<Option<Self>, LoadError> {
        let base = ThemeDir::upstream(input_root, &variant.base_theme);
        if !base.exists() || !base.properties_path().is_file() || !base.messages_path().is_file() {
            debug!(
                variant = %variant.id,
                base_theme = %variant.base_theme,
                "base theme incomplete, skipping variant"
            );
            return Ok(None);
        }

        let mut inputs = Self {
            user_overlay: variant.user_overlay.clone().map(ThemeDir::overlay),
            preset_overlay: variant.preset_overlay.clone().map(ThemeDir::overlay),
            local_override: ThemeDir::overlay(
                override_root.join(&variant.base_theme).join(LOGIN_DIR),
            ),
            inherited: ThemeDir::upstream(input_root, INHERITED_BASE_THEME),
            base,
            properties: PropertyTable::new(),
            messages: PropertyTable::new(),
            page_templates: Vec::new(),
        };

        let mut properties = inputs.base.read_properties()?.unwrap_or_default();
        let mut messages = inputs.base.read_messages()?.unwrap_or_default();
        for layer in inputs.overlays_general_to_specific() {
            if let Some(layer_properties) = layer.read_properties()? {
                properties.extend_missing(&layer_properties);
            }
            if let Some(layer_messages) = layer.read_messages()? {
                messages.extend_overwrite(&layer_messages);
            }
        }

        inputs.page_templates = discover_pages(&inputs.sources())?;
        inputs.properties = properties;
        inputs.messages = messages;

        debug!(
            variant = %variant.id,
            pages = inputs.page_templates.len(),
            properties = inputs.properties.len(),
            messages = inputs.messages.len(),
            "loaded variant inputs"
        );
        Ok(Some(inputs))
    }

    /// All five layers, most specific first. Absent overlays are omitted.
    pub fn sources(&self) -> Vec<&ThemeDir> {
        let mut sources = Vec::with_capacity(5);
        sources.extend(self.user_overlay.as_ref());
        sources.extend(self.preset_overlay.as_ref());
        sources.push(&self.local_override);
        sources.push(&self.base);
        sources.push(&self.inherited);
        sources
    }

    fn overlays_general_to_specific(&self) -> Vec<&ThemeDir> {
        let mut layers = vec![&self.local_override];
        layers.extend(self.preset_overlay.as_ref());
        layers.extend(self.user_overlay.as_ref());
        layers
    }

    /// Template lookup roots, most specific first.
    ///
    /// Overlays and the local override are included only when they exist.
    /// The base theme directory is always present. The inherited base
    /// directory is appended when it exists and differs from the base theme
    /// directory.
    pub fn lookup_chain(&self) -> LookupChain {
        let mut chain = LookupChain::new();
        if let Some(user) = &self.user_overlay {
            chain.push_if_exists(user.root());
        }
        if let Some(preset) = &self.preset_overlay {
            chain.push_if_exists(preset.root());
        }
        chain.push_if_exists(self.local_override.root());
        chain.push(self.base.root());
        if self.inherited.root() != self.base.root() {
            chain.push_if_exists(self.inherited.root());
        }
        chain
    }

    pub fn properties(&self) -> &PropertyTable {
        &self.properties
    }

    pub fn messages(&self) -> &PropertyTable {
        &self.messages
    }

    /// Page template file names, sorted and de-duplicated.
    pub fn page_templates(&self) -> &[String] {
        &self.page_templates
    }
}

/// Unions page templates across `sources`.
///
/// A stem seen under several extensions is listed once, with the
/// higher-priority extension.
fn discover_pages(sources: &[&ThemeDir]) -> Result<Vec<String>, LoadError> {
    let mut by_stem: BTreeMap<String, (usize, String)> = BTreeMap::new();
    for source in sources {
        for name in source.list_pages()? {
            let Some((stem, priority)) = split_template_name(&name) else {
                continue;
            };
            match by_stem.get(stem) {
                Some((existing, _)) if *existing <= priority => {}
                _ => {
                    by_stem.insert(stem.to_string(), (priority, name.clone()));
                }
            }
        }
    }

    let mut pages: Vec<String> = by_stem.into_values().map(|(_, name)| name).collect();
    pages.sort();
    Ok(pages)
}
