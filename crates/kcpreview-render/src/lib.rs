//! # kcpreview-render - Login Theme Preview Rendering
//!
//! `kcpreview-render` resolves layered mock data and theme overlays into
//! rendered preview markup for login themes, one variant at a time.
//!
//! ## Core Concepts
//!
//! - [`OverrideDocument`]: mock data as `{ common, pages }`, with
//!   `"<page>@<scenario>"` keys for named page states
//! - [`Fragment`] and [`deep_merge`]: the JSON object every context layer is
//!   made of, and the rule that combines layers
//! - [`Variant`] / [`VariantInputs`]: a base theme plus overlays, resolved
//!   into a lookup chain, merged properties, merged messages and page list
//! - [`RenderDriver`]: renders every page (and scenario) of a variant,
//!   turning failures into [`Skip`] diagnostics
//! - [`PreviewArtifact`]: the aggregate `pages.json` document
//!
//! ## Precedence At A Glance
//!
//! | Concern | Order (first listed is consulted first) | Conflict rule |
//! |---------|------------------------------------------|---------------|
//! | Templates | user, preset, local override, base, inherited base | first match |
//! | Theme properties | base, local override, preset, user | first definition |
//! | Messages | base, local override, preset, user | last definition |
//! | Mock data | common, page, scenario (built-in, then custom) | last definition, objects merged |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use kcpreview_render::{
//!     OverrideDocument, PreviewArtifact, RenderDriver, ScenarioSource, Variant, VariantInputs,
//! };
//!
//! let overrides = OverrideDocument::load("mocks.json".as_ref())?;
//! let driver = RenderDriver::new("keycloak-dev-resources/themes")?;
//! let mut artifact = PreviewArtifact::new("26.x");
//!
//! let variant = Variant::new("base", "base");
//! if let Some(inputs) = VariantInputs::load(input_root, override_root, &variant)? {
//!     let outcome =
//!         driver.render_variant(&variant, &inputs, &overrides, &ScenarioSource::InlineOverride);
//!     artifact.add_variant(outcome);
//! }
//! artifact.write("out/pages.json".as_ref())?;
//! ```

pub mod context;
pub mod driver;
mod error;
pub mod fragment;
pub mod output;
pub mod overrides;
pub mod postprocess;
pub mod properties;
pub mod scenario;
pub mod source;
pub mod template;
pub mod variant;

pub use error::{summarize_message, LoadError, RenderError, DIAGNOSTIC_MAX_CHARS};

pub use context::{AuthContext, FieldMessages, MessageLookup, PageModel, Sanitizer, TotpPolicy};
pub use driver::{PageOutcome, RenderDriver, Skip, VariantOutcome, DEFAULT_RESOURCE_PREFIX};
pub use fragment::{deep_merge, Fragment};
pub use output::{log_skips, PreviewArtifact, ARTIFACT_FILE_NAME};
pub use overrides::{normalize_page_name, OverrideDocument};
pub use postprocess::MarkupRewriter;
pub use properties::PropertyTable;
pub use scenario::{ScenarioSource, ScenarioSpec};
pub use source::{TemplateSource, ThemeDir};
pub use template::{LookupChain, MiniJinjaEngine, TemplateEngine};
pub use variant::{Variant, VariantInputs};
