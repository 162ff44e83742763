//! Template engine abstraction.
//!
//! The render driver talks to [`TemplateEngine`] only, so the template
//! language stays an implementation detail of this module.

use minijinja::{AutoEscape, Environment, Error, ErrorKind, UndefinedBehavior};

use super::LookupChain;
use crate::context::PageModel;
use crate::error::RenderError;

/// A template engine that renders named templates against a page model.
pub trait TemplateEngine {
    /// Renders the template `name` with `model` as its context.
    fn render_named(&self, name: &str, model: &PageModel) -> Result<String, RenderError>;

    /// Checks if a template with the given name can be resolved.
    fn has_template(&self, name: &str) -> bool;
}

/// MiniJinja-based template engine reading templates through a lookup chain.
///
/// - Every template name resolves through the chain, first match wins.
/// - Output is HTML auto-escaped; values marked safe pass through.
/// - Undefined values are chainable: `realm.name` on a missing `realm` is
///   empty output, not an error. Calling an undefined value still fails.
/// - Trailing newlines are kept.
///
/// # Example
///
/// ```rust,ignore
/// let engine = MiniJinjaEngine::new(inputs.lookup_chain());
/// let html = engine.render_named("login.ftl", &model)?;
/// ```
pub struct MiniJinjaEngine {
    env: Environment<'static>,
    chain: LookupChain,
}

impl MiniJinjaEngine {
    /// Creates an engine whose loader searches `chain`.
    pub fn new(chain: LookupChain) -> Self {
        let mut env = Environment::new();
        let loader_chain = chain.clone();
        env.set_loader(move |name| {
            loader_chain.load(name).map_err(|err| {
                Error::new(
                    ErrorKind::InvalidOperation,
                    format!("could not read template {}", name),
                )
                .with_source(err)
            })
        });
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        env.set_undefined_behavior(UndefinedBehavior::Chainable);
        env.set_keep_trailing_newline(true);
        Self { env, chain }
    }
}

impl TemplateEngine for MiniJinjaEngine {
    fn render_named(&self, name: &str, model: &PageModel) -> Result<String, RenderError> {
        let tmpl = self.env.get_template(name)?;
        Ok(tmpl.render(model.values())?)
    }

    fn has_template(&self, name: &str) -> bool {
        self.chain.resolve(name).is_some()
    }
}
