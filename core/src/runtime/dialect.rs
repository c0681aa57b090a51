//! OpenAPI 3.0 schema dialect normalization.
//!
//! Rewrites the 3.0-only keyword forms into their JSON Schema 2020-12 equivalents
//! so the engine sees one dialect.

use crate::oas::refs::{SCHEMA_KEYWORDS, SCHEMA_LIST_KEYWORDS, SCHEMA_MAP_KEYWORDS};
use serde_json::{Map, Value};

/// Normalizes `schema` and all of its subschemas in place.
///
/// - `nullable: true` adds `"null"` to `type` (and to `enum`, when present).
/// - `exclusiveMinimum: true` + `minimum: n` becomes `exclusiveMinimum: n`.
/// - `exclusiveMaximum: true` + `maximum: n` becomes `exclusiveMaximum: n`.
pub fn normalize_dialect(schema: &mut Value) {
    let Value::Object(map) = schema else {
        return;
    };

    normalize_nullable(map);
    normalize_exclusive(map, "exclusiveMinimum", "minimum");
    normalize_exclusive(map, "exclusiveMaximum", "maximum");

    for (key, child) in map.iter_mut() {
        let key = key.as_str();
        if SCHEMA_MAP_KEYWORDS.contains(&key) {
            if let Value::Object(named) = child {
                named.values_mut().for_each(normalize_dialect);
            }
        } else if SCHEMA_LIST_KEYWORDS.contains(&key) || SCHEMA_KEYWORDS.contains(&key) {
            match child {
                Value::Array(list) => list.iter_mut().for_each(normalize_dialect),
                sub => normalize_dialect(sub),
            }
        }
    }
}

fn normalize_nullable(map: &mut Map<String, Value>) {
    let Some(nullable) = map.remove("nullable") else {
        return;
    };
    if nullable != Value::Bool(true) {
        return;
    }

    let null = Value::String("null".into());
    let widened = match map.get("type") {
        Some(Value::String(ty)) if ty.as_str() != "null" => {
            Some(Value::Array(vec![Value::String(ty.clone()), null]))
        }
        Some(Value::Array(types)) if !types.contains(&null) => {
            let mut types = types.clone();
            types.push(null);
            Some(Value::Array(types))
        }
        _ => None,
    };
    if let Some(ty) = widened {
        map.insert("type".into(), ty);
    }

    if let Some(Value::Array(options)) = map.get_mut("enum") {
        if !options.contains(&Value::Null) {
            options.push(Value::Null);
        }
    }
}

fn normalize_exclusive(map: &mut Map<String, Value>, exclusive: &str, inclusive: &str) {
    match map.get(exclusive) {
        Some(Value::Bool(true)) => {
            map.remove(exclusive);
            if let Some(limit) = map.remove(inclusive) {
                map.insert(exclusive.to_string(), limit);
            }
        }
        Some(Value::Bool(false)) => {
            map.remove(exclusive);
        }
        _ => {}
    }
}
