//! One preview run: load mocks and variants, render, write the artifact.

use std::path::PathBuf;

use anyhow::{Context, Result};
use kcpreview_render::output::log_skips;
use kcpreview_render::{
    LoadError, OverrideDocument, PreviewArtifact, RenderDriver, ScenarioSource, VariantInputs,
    ARTIFACT_FILE_NAME,
};
use tracing::{debug, info};

use crate::cli::Cli;
use crate::config::configured_variants;
use crate::discover::append_user_themes;

/// Loads the built-in mocks and merges the custom mocks over them.
pub fn load_mocks(cli: &Cli) -> Result<OverrideDocument> {
    let builtin = OverrideDocument::load(&cli.context_mocks)
        .with_context(|| format!("loading context mocks {}", cli.context_mocks.display()))?;
    let Some(custom_path) = &cli.custom_mocks else {
        return Ok(builtin);
    };
    let custom = OverrideDocument::load(custom_path)
        .with_context(|| format!("loading custom mocks {}", custom_path.display()))?;
    if custom.is_empty() {
        return Ok(builtin);
    }
    info!("Merging custom mocks from {}", custom_path.display());
    Ok(OverrideDocument::merge_custom(&builtin, &custom))
}

/// Pre-rendered scenarios when a manifest directory is given, otherwise
/// scenarios from the mock document.
pub fn scenario_source(cli: &Cli) -> Result<ScenarioSource> {
    match &cli.scenario_stories {
        Some(dir) => ScenarioSource::external(dir, &cli.scenario_html)
            .with_context(|| format!("reading scenario stories in {}", dir.display())),
        None => Ok(ScenarioSource::InlineOverride),
    }
}

/// Runs the whole pipeline and returns the path of the written artifact.
pub fn run(cli: &Cli) -> Result<PathBuf> {
    if !cli.input.is_dir() {
        return Err(LoadError::InputRootMissing(cli.input.clone()).into());
    }

    let overrides = load_mocks(cli)?;
    let scenarios = scenario_source(cli)?;

    let mut variants = configured_variants(cli.variants.as_deref(), &cli.presets)
        .context("loading variant configuration")?;
    if let Some(root) = &cli.user_theme {
        append_user_themes(root, &mut variants)
            .with_context(|| format!("discovering user themes under {}", root.display()))?;
    }

    let driver = RenderDriver::new(cli.resource_prefix.as_str())?;
    let mut artifact = PreviewArtifact::new(cli.tag.as_str());

    for variant in &variants {
        let inputs = VariantInputs::load(&cli.input, &cli.overrides, variant)
            .with_context(|| format!("loading inputs for variant {}", variant.id))?;
        let Some(inputs) = inputs else {
            debug!(variant = %variant.id, "variant skipped: base theme not found");
            continue;
        };

        let outcome = driver.render_variant(variant, &inputs, &overrides, &scenarios);
        log_skips(&outcome.variant_id, &outcome.skips);
        info!(
            variant = %outcome.variant_id,
            pages = outcome.pages.len(),
            skipped = outcome.skips.len(),
            "rendered variant"
        );
        artifact.add_variant(outcome);
    }

    let path = cli.output.join(ARTIFACT_FILE_NAME);
    artifact
        .write(&path)
        .with_context(|| format!("writing {}", path.display()))?;
    info!("Generated preview artifacts in {}", cli.output.display());
    Ok(path)
}
