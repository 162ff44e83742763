//! Template resolution and rendering.
//!
//! Templates are never registered up front. Each variant gets a
//! [`LookupChain`]: an ordered list of directories searched most-specific
//! first. The engine resolves every template name (the page itself, plus any
//! `extends`, `include` or `import` inside it) through that chain, so an
//! overlay only has to ship the files it changes.
//!
//! ```text
//! user overlay ─▶ preset overlay ─▶ local override ─▶ base theme ─▶ inherited base
//!   (first directory containing the requested file wins)
//! ```
//!
//! [`TemplateEngine`] is the seam between the render driver and the template
//! language; [`MiniJinjaEngine`] is the implementation in use.

mod chain;
mod engine;

pub(crate) use chain::is_contained;
pub use chain::LookupChain;
pub use engine::{MiniJinjaEngine, TemplateEngine};
