//! JSON fragments and the deep-merge rule.
//!
//! A [`Fragment`] is an ordered JSON object: the unit of partial render
//! context. Every layer of mock data (common, page, scenario, custom
//! overrides) is a fragment, and the final render context is the fold of
//! those layers under [`deep_merge`].
//!
//! # Merge Rule
//!
//! For each key in the source:
//!
//! 1. If both target and source hold objects, merge them recursively.
//! 2. Otherwise the source value replaces the target value.
//!
//! Replaced values are structural clones. A merged fragment never shares
//! state with the layers it was built from, so injecting computed keys into
//! one render context can never leak into another.
//!
//! ```rust
//! use kcpreview_render::fragment::{deep_merge, Fragment};
//! use serde_json::json;
//!
//! let mut target: Fragment = json!({ "realm": { "name": "demo", "displayName": "Demo" } })
//!     .as_object()
//!     .cloned()
//!     .unwrap();
//! let source = json!({ "realm": { "displayName": "Custom" }, "locale": "en" });
//!
//! deep_merge(&mut target, source.as_object().unwrap());
//! assert_eq!(
//!     serde_json::Value::Object(target),
//!     json!({ "realm": { "name": "demo", "displayName": "Custom" }, "locale": "en" })
//! );
//! ```

use serde_json::{Map, Value};

/// An insertion-ordered JSON object used as (partial) render context.
pub type Fragment = Map<String, Value>;

/// Deep-merges `source` into `target` in place.
///
/// No-op when `source` is empty.
pub fn deep_merge(target: &mut Fragment, source: &Fragment) {
    for (key, source_value) in source {
        if let (Some(Value::Object(target_child)), Value::Object(source_child)) =
            (target.get_mut(key), source_value)
        {
            deep_merge(target_child, source_child);
            continue;
        }
        target.insert(key.clone(), source_value.clone());
    }
}

/// Folds `layers` left to right into a fresh fragment.
///
/// Later layers win on conflicting leaves.
pub fn merged<'a, I>(layers: I) -> Fragment
where
    I: IntoIterator<Item = &'a Fragment>,
{
    let mut result = Fragment::new();
    for layer in layers {
        deep_merge(&mut result, layer);
    }
    result
}

/// Coerces any JSON value into a fragment.
///
/// Objects are cloned; every other value (including null) becomes an empty
/// fragment.
pub fn as_fragment(value: Option<&Value>) -> Fragment {
    match value {
        Some(Value::Object(map)) => map.clone(),
        _ => Fragment::new(),
    }
}

/// Returns the object stored under `key`, if that value is an object.
pub fn child_mut<'a>(fragment: &'a mut Fragment, key: &str) -> Option<&'a mut Fragment> {
    match fragment.get_mut(key) {
        Some(Value::Object(map)) => Some(map),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn frag(value: Value) -> Fragment {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_merge_nested_objects() {
        let mut target = frag(json!({ "a": 1, "b": { "x": 1 } }));
        deep_merge(&mut target, &frag(json!({ "b": { "y": 2 }, "c": 3 })));
        assert_eq!(
            Value::Object(target),
            json!({ "a": 1, "b": { "x": 1, "y": 2 }, "c": 3 })
        );
    }

    #[test]
    fn test_scalar_replaces_object() {
        let mut target = frag(json!({ "b": { "x": 1 } }));
        deep_merge(&mut target, &frag(json!({ "b": "flat" })));
        assert_eq!(Value::Object(target), json!({ "b": "flat" }));
    }

    #[test]
    fn test_object_replaces_scalar() {
        let mut target = frag(json!({ "b": 5 }));
        deep_merge(&mut target, &frag(json!({ "b": { "x": 1 } })));
        assert_eq!(Value::Object(target), json!({ "b": { "x": 1 } }));
    }

    #[test]
    fn test_arrays_are_replaced_not_concatenated() {
        let mut target = frag(json!({ "list": [1, 2, 3] }));
        deep_merge(&mut target, &frag(json!({ "list": [9] })));
        assert_eq!(Value::Object(target), json!({ "list": [9] }));
    }

    #[test]
    fn test_null_source_value_replaces() {
        let mut target = frag(json!({ "message": { "summary": "x" } }));
        deep_merge(&mut target, &frag(json!({ "message": null })));
        assert_eq!(Value::Object(target), json!({ "message": null }));
    }

    #[test]
    fn test_empty_source_is_noop() {
        let mut target = frag(json!({ "a": 1 }));
        deep_merge(&mut target, &Fragment::new());
        assert_eq!(Value::Object(target), json!({ "a": 1 }));
    }

    #[test]
    fn test_merge_preserves_insertion_order() {
        let mut target = frag(json!({ "z": 1, "a": 2 }));
        deep_merge(&mut target, &frag(json!({ "m": 3, "z": 4 })));
        let keys: Vec<&String> = target.keys().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_merged_result_does_not_alias_source() {
        let source = frag(json!({ "nested": { "list": [1, 2] } }));
        let mut result = merged([&source]);
        child_mut(&mut result, "nested")
            .unwrap()
            .insert("extra".into(), json!(true));
        assert_eq!(Value::Object(source), json!({ "nested": { "list": [1, 2] } }));
    }

    #[test]
    fn test_as_fragment_coerces_non_objects() {
        assert!(as_fragment(Some(&json!([1, 2]))).is_empty());
        assert!(as_fragment(Some(&json!("text"))).is_empty());
        assert!(as_fragment(Some(&Value::Null)).is_empty());
        assert!(as_fragment(None).is_empty());
        assert_eq!(as_fragment(Some(&json!({ "k": 1 }))).len(), 1);
    }

    fn leaf_layer() -> impl Strategy<Value = Fragment> {
        prop::collection::btree_map("[a-e]", 0i64..100, 0..5).prop_map(|entries| {
            entries
                .into_iter()
                .map(|(k, v)| (k, json!({ "leaf": v })))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_merge_is_associative(a in leaf_layer(), b in leaf_layer(), c in leaf_layer()) {
            let left = merged([&a, &b, &c]);
            let bc = merged([&b, &c]);
            let right = merged([&a, &bc]);
            prop_assert_eq!(Value::Object(left), Value::Object(right));
        }

        #[test]
        fn prop_last_layer_wins(a in leaf_layer(), b in leaf_layer()) {
            let result = merged([&a, &b]);
            for (key, value) in &b {
                prop_assert_eq!(result.get(key), Some(value));
            }
            for (key, value) in &a {
                if !b.contains_key(key) {
                    prop_assert_eq!(result.get(key), Some(value));
                }
            }
        }
    }
}
