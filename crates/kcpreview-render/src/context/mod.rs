//! Render context construction.
//!
//! A [`PageModel`] is the complete set of named values one template render
//! sees. It starts from a resolved mock fragment (common, page and scenario
//! layers already merged) and adds the runtime values a login theme expects:
//!
//! | Key | Value |
//! |-----|-------|
//! | `properties` | merged theme properties |
//! | `msg`, `advancedMsg` | [`MessageLookup`] callables |
//! | `kcSanitize` | [`Sanitizer`] callable |
//! | `pageId` | page id without `.html` |
//! | `url.resourcesPath` | `/<prefix>/<variant>/login/resources`, only if `url` is an object |
//! | `messagesPerField` | [`FieldMessages`], always present |
//! | `auth` | [`AuthContext`], always present |
//! | `totp.policy` | [`TotpPolicy`], only if `totp` is an object |
//!
//! Runtime values replace mock values of the same name.

mod auth;
mod field;
mod message;

pub use auth::{AuthContext, TotpPolicy};
pub use field::FieldMessages;
pub use message::{format_message, MessageLookup, PatternError, Sanitizer};

use std::collections::BTreeMap;
use std::sync::Arc;

use minijinja::Value;

use crate::fragment::{child_mut, Fragment};
use crate::properties::PropertyTable;
use crate::variant::VariantInputs;

/// Builds the resource path for a variant.
pub fn resources_path(resource_prefix: &str, variant_id: &str) -> String {
    format!(
        "/{}/{}/login/resources",
        resource_prefix.trim_matches('/'),
        variant_id
    )
}

/// Named values handed to the template engine for one render.
#[derive(Debug, Clone, Default)]
pub struct PageModel {
    values: BTreeMap<String, Value>,
}

impl PageModel {
    /// Builds the model for one (variant, page, scenario) render.
    ///
    /// `fragment` must be a fresh copy; it is consumed.
    pub fn build(
        fragment: Fragment,
        page_id: &str,
        variant_id: &str,
        inputs: &VariantInputs,
        resource_prefix: &str,
    ) -> Self {
        Self::assemble(
            fragment,
            page_id,
            &resources_path(resource_prefix, variant_id),
            inputs.properties(),
            inputs.messages(),
        )
    }

    fn assemble(
        mut fragment: Fragment,
        page_id: &str,
        resources_path: &str,
        properties: &PropertyTable,
        messages: &PropertyTable,
    ) -> Self {
        if let Some(url) = child_mut(&mut fragment, "url") {
            url.insert("resourcesPath".into(), resources_path.into());
        }
        if let Some(totp) = child_mut(&mut fragment, "totp") {
            totp.insert("policy".into(), TotpPolicy.to_json());
        }
        let field_messages = FieldMessages::from_value(fragment.get("messagesPerField"));
        let auth = AuthContext::from_value(fragment.get("auth"));

        let mut values: BTreeMap<String, Value> = fragment
            .iter()
            .map(|(key, value)| (key.clone(), Value::from_serialize(value)))
            .collect();

        let lookup = Value::from_object(MessageLookup::new(Arc::new(messages.clone())));
        values.insert("properties".into(), Value::from_serialize(properties));
        values.insert("msg".into(), lookup.clone());
        values.insert("advancedMsg".into(), lookup);
        values.insert("kcSanitize".into(), Value::from_object(Sanitizer));
        values.insert(
            "pageId".into(),
            Value::from(page_id.replace(".html", "")),
        );
        values.insert("messagesPerField".into(), Value::from_object(field_messages));
        values.insert("auth".into(), Value::from_object(auth));

        Self { values }
    }

    /// A model from raw values, with no runtime additions.
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        Self {
            values: values.into_iter().collect(),
        }
    }

    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}
