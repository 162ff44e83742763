//! Per-field error messages (`messagesPerField`).

use std::sync::Arc;

use indexmap::IndexMap;
use minijinja::value::{Enumerator, Object};
use minijinja::{Error, ErrorKind, State, Value};

use super::message::arg_text;

/// Field name to error message, in document order.
///
/// Templates query it with candidate field names; the first name with a
/// non-empty message wins. Called without names, the first message wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMessages {
    errors: IndexMap<String, String>,
}

impl FieldMessages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds from a mock value. Non-objects give an empty set and null
    /// entries are dropped.
    pub fn from_value(value: Option<&serde_json::Value>) -> Self {
        let Some(serde_json::Value::Object(map)) = value else {
            return Self::new();
        };
        let errors = map
            .iter()
            .filter_map(|(field, message)| match message {
                serde_json::Value::Null => None,
                serde_json::Value::String(text) => Some((field.clone(), text.clone())),
                other => Some((field.clone(), other.to_string())),
            })
            .collect();
        Self { errors }
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// The first message matching `fields`, or the first message overall
    /// when `fields` is empty.
    pub fn find_first(&self, fields: &[String]) -> Option<&str> {
        if fields.is_empty() {
            return self.errors.values().next().map(String::as_str);
        }
        fields
            .iter()
            .filter_map(|field| self.errors.get(field))
            .find(|message| !message.is_empty())
            .map(String::as_str)
    }

    pub fn exists(&self, fields: &[String]) -> bool {
        self.find_first(fields).is_some()
    }

    /// The first matching message, or an empty string.
    pub fn get(&self, fields: &[String]) -> &str {
        self.find_first(fields).unwrap_or_default()
    }
}

impl Object for FieldMessages {
    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        self.errors.get(key.as_str()?).map(|message| Value::from(message.as_str()))
    }

    fn enumerate(self: &Arc<Self>) -> Enumerator {
        Enumerator::Values(self.errors.keys().map(|k| Value::from(k.as_str())).collect())
    }

    fn call_method(
        self: &Arc<Self>,
        _state: &State,
        name: &str,
        args: &[Value],
    ) -> Result<Value, Error> {
        let fields: Vec<String> = args
            .iter()
            .filter(|arg| !arg.is_none() && !arg.is_undefined())
            .map(arg_text)
            .collect();
        match name {
            "exists" | "existsError" => Ok(Value::from(self.exists(&fields))),
            "get" | "getFirstError" | "printIfExists" => Ok(Value::from(self.get(&fields))),
            _ => Err(Error::new(
                ErrorKind::UnknownMethod,
                format!("messagesPerField has no method '{}'", name),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn names(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|s| s.to_string()).collect()
    }

    fn sample() -> FieldMessages {
        FieldMessages::from_value(Some(&json!({
            "username": "",
            "password": "Invalid password",
            "email": "Invalid email",
            "ignored": null
        })))
    }

    #[test]
    fn test_null_entries_dropped() {
        assert_eq!(sample().len(), 3);
    }

    #[test]
    fn test_first_non_empty_in_argument_order() {
        let fields = sample();
        assert_eq!(fields.get(&names(&["username", "email", "password"])), "Invalid email");
        assert_eq!(fields.get(&names(&["password", "email"])), "Invalid password");
        assert!(fields.exists(&names(&["username", "password"])));
    }

    #[test]
    fn test_empty_message_does_not_exist() {
        let fields = sample();
        assert!(!fields.exists(&names(&["username"])));
        assert_eq!(fields.get(&names(&["username"])), "");
        assert_eq!(fields.get(&names(&["unknown"])), "");
    }

    #[test]
    fn test_no_names_returns_first_value() {
        let fields = sample();
        assert_eq!(fields.find_first(&[]), Some(""));
        assert!(fields.exists(&[]));
        assert!(!FieldMessages::new().exists(&[]));
    }

    #[test]
    fn test_non_object_is_empty() {
        assert!(FieldMessages::from_value(Some(&json!("oops"))).is_empty());
        assert!(FieldMessages::from_value(None).is_empty());
    }

    #[test]
    fn test_methods_from_template() {
        let mut env = minijinja::Environment::new();
        env.add_global("messagesPerField", Value::from_object(sample()));
        let output = env
            .render_str(
                "{{ messagesPerField.existsError('username', 'password') }}|{{ messagesPerField.get('email') }}|{{ messagesPerField.printIfExists('nope') }}",
                minijinja::context! {},
            )
            .unwrap();
        assert_eq!(output, "true|Invalid email|");
    }
}
