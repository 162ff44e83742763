//! Error types for preview resolution and rendering.
//!
//! Failures come in two severities:
//!
//! - [`RenderError`]: scoped to a single page or scenario render. The render
//!   driver converts these into one-line skip diagnostics and keeps going.
//! - [`LoadError`]: aborts the whole run (missing input root, malformed
//!   scenario manifest, unreadable mock document).

use std::fmt;
use std::path::PathBuf;

/// Maximum length of a one-line skip diagnostic, in characters.
pub const DIAGNOSTIC_MAX_CHARS: usize = 180;

/// Error type for a single template render.
///
/// Keeps the template engine's error type out of the public API; the driver
/// only ever needs a message and a kind name.
#[derive(Debug)]
pub enum RenderError {
    /// Template syntax error or compilation failure.
    TemplateError(String),

    /// Template not found anywhere on the lookup chain.
    TemplateNotFound(String),

    /// A template referenced a value that does not exist.
    UndefinedValue(String),

    /// Data could not be converted into the engine's context.
    ContextError(String),

    /// I/O error (e.g., reading a template or artifact from disk).
    IoError(std::io::Error),

    /// Other operational error raised while rendering.
    OperationError(String),
}

impl RenderError {
    /// Short name of the error kind, used when the error carries no message.
    pub fn kind_name(&self) -> &'static str {
        match self {
            RenderError::TemplateError(_) => "TemplateError",
            RenderError::TemplateNotFound(_) => "TemplateNotFound",
            RenderError::UndefinedValue(_) => "UndefinedValue",
            RenderError::ContextError(_) => "ContextError",
            RenderError::IoError(_) => "IoError",
            RenderError::OperationError(_) => "OperationError",
        }
    }

    /// The error's own message, without the kind prefix.
    pub fn detail(&self) -> String {
        match self {
            RenderError::TemplateError(msg)
            | RenderError::TemplateNotFound(msg)
            | RenderError::UndefinedValue(msg)
            | RenderError::ContextError(msg)
            | RenderError::OperationError(msg) => msg.clone(),
            RenderError::IoError(err) => err.to_string(),
        }
    }

    /// One-line diagnostic for skip reporting.
    ///
    /// First line of the message, truncated to [`DIAGNOSTIC_MAX_CHARS`], or
    /// the kind name when there is no message at all.
    pub fn summarize(&self) -> String {
        if self.detail().trim().is_empty() {
            return self.kind_name().to_string();
        }
        summarize_message(&self.detail())
    }
}

/// Reduces an arbitrary error message to a single bounded line.
pub fn summarize_message(message: &str) -> String {
    let first_line = message
        .split(['\r', '\n', '\u{0B}', '\u{0C}', '\u{85}', '\u{2028}', '\u{2029}'])
        .next()
        .unwrap_or("")
        .trim();
    if first_line.chars().count() > DIAGNOSTIC_MAX_CHARS {
        let head: String = first_line.chars().take(DIAGNOSTIC_MAX_CHARS - 3).collect();
        return format!("{}...", head);
    }
    first_line.to_string()
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::TemplateError(msg) => write!(f, "template error: {}", msg),
            RenderError::TemplateNotFound(name) => write!(f, "template not found: {}", name),
            RenderError::UndefinedValue(msg) => write!(f, "undefined value: {}", msg),
            RenderError::ContextError(msg) => write!(f, "context error: {}", msg),
            RenderError::IoError(err) => write!(f, "I/O error: {}", err),
            RenderError::OperationError(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for RenderError {
    fn from(err: std::io::Error) -> Self {
        RenderError::IoError(err)
    }
}

impl From<serde_json::Error> for RenderError {
    fn from(err: serde_json::Error) -> Self {
        RenderError::ContextError(err.to_string())
    }
}

impl From<minijinja::Error> for RenderError {
    fn from(err: minijinja::Error) -> Self {
        use minijinja::ErrorKind;

        match err.kind() {
            ErrorKind::TemplateNotFound => RenderError::TemplateNotFound(err.to_string()),
            ErrorKind::UndefinedError => RenderError::UndefinedValue(err.to_string()),
            ErrorKind::SyntaxError
            | ErrorKind::BadEscape
            | ErrorKind::UnknownTest
            | ErrorKind::UnknownFunction
            | ErrorKind::UnknownFilter
            | ErrorKind::UnknownMethod => RenderError::TemplateError(err.to_string()),
            ErrorKind::BadSerialization => RenderError::ContextError(err.to_string()),
            _ => RenderError::OperationError(err.to_string()),
        }
    }
}

/// Errors that abort the whole preview run.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The upstream theme root does not exist.
    #[error("Input root not found: {}", .0.display())]
    InputRootMissing(PathBuf),

    /// A file that exists could not be read.
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("Invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A scenario manifest has no usable `page` value.
    #[error("Scenario stories file is missing \"page\": {}", .0.display())]
    ManifestMissingPage(PathBuf),

    /// A scenario manifest's `stories` value is not an array.
    #[error("Scenario stories file must include a \"stories\" array: {}", .0.display())]
    ManifestStoriesNotArray(PathBuf),

    /// A story inside a scenario manifest has no `id`.
    #[error("Scenario {index} in {} is missing \"id\".", .path.display())]
    ManifestStoryMissingId { index: usize, path: PathBuf },

    /// A markup rewrite pattern failed to compile.
    #[error("Invalid markup pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl LoadError {
    /// Wraps an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wraps a JSON parse error with the document's path.
    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}
