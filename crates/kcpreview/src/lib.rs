//! # kcpreview - Login Theme Preview Generator
//!
//! Renders the login pages of every configured theme variant with mock
//! data and writes them to a single `pages.json` artifact. Rendering itself
//! lives in [`kcpreview_render`]; this crate is the command-line surface
//! around it:
//!
//! - [`cli`]: arguments and log level selection
//! - [`config`]: built-in variants and the optional variants file
//! - [`discover`]: user themes found under a search root
//! - [`run`]: the pipeline from mocks to artifact

pub mod cli;
pub mod config;
pub mod discover;
pub mod run;

pub use cli::Cli;
pub use config::{ConfigError, VariantEntry};
pub use run::run;
