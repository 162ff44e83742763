//! Message lookup and the pass-through sanitizer.

use std::sync::Arc;

use minijinja::value::Object;
use minijinja::{Error, ErrorKind, State, Value};

use crate::properties::PropertyTable;

/// A message pattern that could not be formatted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    #[error("Unmatched braces in the pattern: {0}")]
    UnmatchedBraces(String),

    #[error("can't parse argument number: {0}")]
    BadArgument(String),
}

/// Substitutes positional `{N}` arguments into `pattern`.
///
/// - `''` is a literal quote; a single `'` toggles a quoted section whose
///   text (braces included) is copied literally.
/// - `{N,type,style}` uses only the index.
/// - An index with no matching argument is left as `{N}`.
pub fn format_message(pattern: &str, args: &[String]) -> Result<String, PatternError> {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();
    let mut quoted = false;

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                if chars.peek() == Some(&'\'') {
                    chars.next();
                    out.push('\'');
                } else {
                    quoted = !quoted;
                }
            }
            '{' if !quoted => {
                let mut placeholder = String::new();
                let mut depth = 1;
                loop {
                    match chars.next() {
                        None => return Err(PatternError::UnmatchedBraces(pattern.to_string())),
                        Some('{') => {
                            depth += 1;
                            placeholder.push('{');
                        }
                        Some('}') => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                            placeholder.push('}');
                        }
                        Some(other) => placeholder.push(other),
                    }
                }

                let index_text = placeholder.split(',').next().unwrap_or_default().trim();
                let index: usize = index_text
                    .parse()
                    .map_err(|_| PatternError::BadArgument(index_text.to_string()))?;
                match args.get(index) {
                    Some(arg) => out.push_str(arg),
                    None => {
                        out.push('{');
                        out.push_str(index_text);
                        out.push('}');
                    }
                }
            }
            other => out.push(other),
        }
    }
    Ok(out)
}

/// Text of a template argument; none and undefined become empty.
pub(crate) fn arg_text(value: &Value) -> String {
    if value.is_undefined() || value.is_none() {
        return String::new();
    }
    match value.as_str() {
        Some(text) => text.to_string(),
        None => value.to_string(),
    }
}

/// `msg(key, args...)`: resolves a message key against the variant's bundle.
#[derive(Debug, Clone)]
pub struct MessageLookup {
    messages: Arc<PropertyTable>,
}

impl MessageLookup {
    pub fn new(messages: Arc<PropertyTable>) -> Self {
        Self { messages }
    }

    /// Unknown keys resolve to themselves. Without arguments the raw pattern
    /// is returned untouched.
    pub fn lookup(&self, key: &str, args: &[String]) -> Result<String, PatternError> {
        let pattern = self.messages.get(key).unwrap_or(key);
        if args.is_empty() {
            return Ok(pattern.to_string());
        }
        format_message(pattern, args)
    }
}

impl Object for MessageLookup {
    fn call(self: &Arc<Self>, _state: &State<'_, '_>, args: &[Value]) -> Result<Value, Error> {
        let Some((key, rest)) = args.split_first() else {
            return Ok(Value::from(""));
        };
        let rest: Vec<String> = rest.iter().map(arg_text).collect();
        self.lookup(&arg_text(key), &rest)
            .map(Value::from)
            .map_err(|err| Error::new(ErrorKind::InvalidOperation, err.to_string()))
    }
}

/// `kcSanitize(markup)`: returns its argument as safe markup.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sanitizer;

impl Object for Sanitizer {
    fn call(self: &Arc<Self>, _state: &State<'_, '_>, args: &[Value]) -> Result<Value, Error> {
        let text = args.first().map(arg_text).unwrap_or_default();
        Ok(Value::from_safe_string(text))
    }
}
