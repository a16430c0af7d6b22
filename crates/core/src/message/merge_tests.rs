// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;
use yare::parameterized;

#[parameterized(
    disjoint_keys = { json!({"a": 1}), json!({"b": 2}), json!({"a": 1, "b": 2}) },
    overlay_wins = { json!({"a": 1}), json!({"a": 2}), json!({"a": 2}) },
    nested_objects_merge = {
        json!({"o": {"x": 1, "y": 1}}),
        json!({"o": {"y": 2}}),
        json!({"o": {"x": 1, "y": 2}})
    },
    arrays_replace = { json!({"l": [1, 2]}), json!({"l": [3]}), json!({"l": [3]}) },
    null_keeps_base = { json!({"a": 1}), json!({"a": null}), json!({"a": 1}) },
    null_overlay_is_noop = { json!({"a": 1}), json!(null), json!({"a": 1}) },
    object_replaces_scalar = { json!({"a": 1}), json!({"a": {"b": 1}}), json!({"a": {"b": 1}}) },
)]
fn merge_cases(base: Value, overlay: Value, expected: Value) {
    let mut merged = base;
    deep_merge(&mut merged, &overlay);
    assert_eq!(merged, expected);
}

#[test]
fn overlay_is_not_aliased_into_base() {
    let overlay = json!({"o": {"k": "v"}});
    let mut base = json!({});
    deep_merge(&mut base, &overlay);
    base["o"]["k"] = json!("changed");
    assert_eq!(overlay["o"]["k"], json!("v"));
}
