//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;
use kcpreview_render::DEFAULT_RESOURCE_PREFIX;
use tracing::level_filters::LevelFilter;

/// Render login theme preview pages for every configured variant.
#[derive(Debug, Clone, Parser)]
#[command(name = "kcpreview", version, about)]
pub struct Cli {
    /// Root of the upstream themes (`<input>/<theme>/login`)
    #[arg(long, default_value = "public/keycloak-upstream")]
    pub input: PathBuf,

    /// Root of the local theme overrides (`<overrides>/<theme>/login`)
    #[arg(long, default_value = "public/keycloak-dev-resources/themes")]
    pub overrides: PathBuf,

    /// Root of the preset overlays (`<presets>/<variant>/login`)
    #[arg(long, default_value = "public/keycloak-dev-resources/themes")]
    pub presets: PathBuf,

    /// Directory that receives pages.json
    #[arg(long, default_value = "src/features/preview/generated")]
    pub output: PathBuf,

    /// Built-in mock data document
    #[arg(long)]
    pub context_mocks: PathBuf,

    /// Mock data merged over the built-in document
    #[arg(long)]
    pub custom_mocks: Option<PathBuf>,

    /// Directory of *.stories.json manifests; enables pre-rendered scenarios
    #[arg(long)]
    pub scenario_stories: Option<PathBuf>,

    /// Root of the pre-rendered scenario markup (`<root>/<variant>/...`)
    #[arg(long, default_value = "tools/preview-renderer/scenario-html")]
    pub scenario_html: PathBuf,

    /// Upstream release tag recorded in the artifact
    #[arg(long, default_value = "26.x")]
    pub tag: String,

    /// Search root for extra user themes
    #[arg(long)]
    pub user_theme: Option<PathBuf>,

    /// YAML file replacing the built-in variant list
    #[arg(long)]
    pub variants: Option<PathBuf>,

    /// URL prefix of static theme resources
    #[arg(long, default_value = DEFAULT_RESOURCE_PREFIX)]
    pub resource_prefix: String,

    /// Log resolution details
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Log level used when `RUST_LOG` is not set.
    pub fn default_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::DEBUG
        } else if self.quiet {
            LevelFilter::ERROR
        } else {
            LevelFilter::INFO
        }
    }
}
