//! Deep merge for configuration trees.
//!
//! Mappings merge recursively by key, sequences concatenate (base elements
//! first), and any other combination lets the overlay value win.

use serde_json::{Map, Value};

/// Merges `overlay` into `base` in place.
pub fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            merge_maps(base_map, overlay_map);
        }
        (Value::Array(base_items), Value::Array(overlay_items)) => {
            base_items.extend(overlay_items);
        }
        (base, overlay) => {
            *base = overlay;
        }
    }
}

/// Merges every key of `overlay` into `base`.
pub fn merge_maps(base: &mut Map<String, Value>, overlay: Map<String, Value>) {
    for (key, value) in overlay {
        match base.get_mut(&key) {
            Some(existing) => deep_merge(existing, value),
            None => {
                base.insert(key, value);
            }
        }
    }
}

/// Merges `value` at a nested key path, creating intermediate mappings.
///
/// A non-mapping found along the path is replaced by an empty mapping.
pub fn merge_at_path(map: &mut Map<String, Value>, path: &[String], value: Value) {
    let Some((first, rest)) = path.split_first() else {
        if let Value::Object(overlay) = value {
            merge_maps(map, overlay);
        }
        return;
    };

    if rest.is_empty() {
        match map.get_mut(first) {
            Some(existing) => deep_merge(existing, value),
            None => {
                map.insert(first.clone(), value);
            }
        }
        return;
    }

    if !matches!(map.get(first), Some(Value::Object(_))) {
        map.insert(first.clone(), Value::Object(Map::new()));
    }

    if let Some(Value::Object(nested)) = map.get_mut(first) {
        merge_at_path(nested, rest, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn merged(mut base: Value, overlay: Value) -> Value {
        deep_merge(&mut base, overlay);
        base
    }

    #[test]
    fn test_array_concatenation() {
        let result = merged(json!({"a": [1, 2]}), json!({"a": [3]}));
        assert_eq!(result, json!({"a": [1, 2, 3]}));
    }

    #[test]
    fn test_scalar_override() {
        let result = merged(json!({"a": 1}), json!({"a": 2}));
        assert_eq!(result, json!({"a": 2}));
    }

    #[test]
    fn test_nested_mappings_recurse() {
        let result = merged(
            json!({"resolve": {"alias": {"jquery": "/a"}, "extensions": [".js"]}}),
            json!({"resolve": {"alias": {"vue": "/b"}, "extensions": [".vue"]}}),
        );
        assert_eq!(
            result,
            json!({
                "resolve": {
                    "alias": {"jquery": "/a", "vue": "/b"},
                    "extensions": [".js", ".vue"]
                }
            })
        );
    }

    #[test]
    fn test_type_mismatch_overlay_wins() {
        let result = merged(json!({"a": [1], "b": {"c": 1}}), json!({"a": "x", "b": 5}));
        assert_eq!(result, json!({"a": "x", "b": 5}));

        let result = merged(json!({"a": 1}), json!({"a": [1]}));
        assert_eq!(result, json!({"a": [1]}));
    }

    #[test]
    fn test_null_overrides() {
        let result = merged(json!({"a": 1}), json!({"a": null}));
        assert!(result["a"].is_null());
    }

    #[test]
    fn test_new_keys_keep_insertion_order() {
        let result = merged(json!({"b": 1, "a": 2}), json!({"c": 3, "a": 4}));
        let keys: Vec<_> = result.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["b", "a", "c"]);
    }

    #[test]
    fn test_merge_at_path_creates_parents() {
        let mut map = Map::new();
        map.insert("port".into(), json!(8080));
        merge_at_path(
            &mut map,
            &["dev".to_string(), "server".to_string()],
            json!("localhost"),
        );
        assert_eq!(Value::Object(map), json!({"port": 8080, "dev": {"server": "localhost"}}));
    }

    #[test]
    fn test_merge_at_path_replaces_scalar_parent() {
        let mut map = Map::new();
        map.insert("dev".into(), json!(true));
        merge_at_path(&mut map, &["dev".to_string(), "port".to_string()], json!(1));
        assert_eq!(map["dev"], json!({"port": 1}));
    }
}
