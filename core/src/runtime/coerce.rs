//! In-place type coercion and default filling.
//!
//! Transport values (path segments, query strings, headers) arrive as strings.
//! Before validation they are converted towards the schema's declared `type`,
//! and missing properties are filled from `default`, mirroring what hosts in
//! weakly-typed ecosystems expect from a request validator.

use crate::runtime::engine::{CoercionMode, EngineOptions};
use serde_json::{Number, Value};

/// Bound on `$ref` / nesting depth followed while coercing.
const MAX_DEPTH: usize = 64;

/// Applies coercion and defaults for one root schema.
#[derive(Debug, Clone)]
pub struct Coercer {
    root: Value,
    options: EngineOptions,
}

impl Coercer {
    /// Creates a coercer for `root`; `#/...` references resolve against it.
    pub fn new(root: Value, options: EngineOptions) -> Self {
        Self { root, options }
    }

    /// Rewrites `data` in place. Never fails; values that cannot be coerced are
    /// left for the validator to report.
    pub fn apply(&self, data: &mut Value) {
        if self.options.coerce == CoercionMode::Off && !self.options.use_defaults {
            return;
        }
        self.visit(&self.root, data, 0);
    }

    fn visit(&self, schema: &Value, data: &mut Value, depth: usize) {
        if depth > MAX_DEPTH {
            return;
        }
        let Value::Object(schema_map) = schema else {
            return;
        };

        if let Some(target) = schema_map
            .get("$ref")
            .and_then(Value::as_str)
            .and_then(|r| r.strip_prefix('#'))
            .and_then(|pointer| self.root.pointer(pointer))
        {
            self.visit(target, data, depth + 1);
        }

        if let Some(Value::Array(all_of)) = schema_map.get("allOf") {
            for sub in all_of {
                self.visit(sub, data, depth + 1);
            }
        }

        if self.options.coerce != CoercionMode::Off {
            self.coerce_type(schema, data);
        }

        match data {
            Value::Object(object) => {
                let properties = schema_map.get("properties").and_then(Value::as_object);

                if let Some(properties) = properties {
                    if self.options.use_defaults {
                        for (name, property) in properties {
                            let Some(default) = property.get("default") else {
                                continue;
                            };
                            let empty = match object.get(name) {
                                None | Some(Value::Null) => true,
                                Some(Value::String(s)) => s.is_empty(),
                                _ => false,
                            };
                            if empty {
                                object.insert(name.clone(), default.clone());
                            }
                        }
                    }
                    for (name, property) in properties {
                        if let Some(child) = object.get_mut(name) {
                            self.visit(property, child, depth + 1);
                        }
                    }
                }

                if let Some(extra @ Value::Object(_)) = schema_map.get("additionalProperties") {
                    for (name, child) in object.iter_mut() {
                        if properties.is_some_and(|p| p.contains_key(name)) {
                            continue;
                        }
                        self.visit(extra, child, depth + 1);
                    }
                }
            }
            Value::Array(items) => {
                if let Some(item_schema @ Value::Object(_)) = schema_map.get("items") {
                    for item in items.iter_mut() {
                        self.visit(item_schema, item, depth + 1);
                    }
                }
            }
            _ => {}
        }
    }

    fn coerce_type(&self, schema: &Value, data: &mut Value) {
        let types: Vec<&str> = match schema.get("type") {
            Some(Value::String(ty)) => vec![ty.as_str()],
            Some(Value::Array(list)) => list.iter().filter_map(Value::as_str).collect(),
            _ => return,
        };
        if types.is_empty() || types.iter().any(|ty| matches_type(data, ty)) {
            return;
        }

        if self.options.coerce == CoercionMode::Array {
            if types.contains(&"array") {
                if !data.is_array() {
                    *data = Value::Array(vec![data.take()]);
                }
                return;
            }
            if let Value::Array(items) = data {
                if items.len() == 1 {
                    let only = items.remove(0);
                    *data = only;
                    if types.iter().any(|ty| matches_type(data, ty)) {
                        return;
                    }
                }
            }
        }

        if let Some(coerced) = types.iter().find_map(|ty| coerce_scalar(data, ty)) {
            *data = coerced;
        }
    }
}

fn matches_type(data: &Value, ty: &str) -> bool {
    match (ty, data) {
        ("null", Value::Null)
        | ("boolean", Value::Bool(_))
        | ("string", Value::String(_))
        | ("array", Value::Array(_))
        | ("object", Value::Object(_))
        | ("number", Value::Number(_)) => true,
        ("integer", Value::Number(n)) => {
            n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
        }
        _ => false,
    }
}

fn coerce_scalar(data: &Value, ty: &str) -> Option<Value> {
    match (ty, data) {
        ("string", Value::Number(n)) => Some(Value::String(n.to_string())),
        ("string", Value::Bool(b)) => Some(Value::String(b.to_string())),
        ("string", Value::Null) => Some(Value::String(String::new())),

        ("number", Value::String(s)) => parse_number(s),
        ("integer", Value::String(s)) => parse_integer(s),
        ("number" | "integer", Value::Bool(b)) => Some(Value::from(u8::from(*b))),
        ("number" | "integer", Value::Null) => Some(Value::from(0)),

        ("boolean", Value::String(s)) => match s.as_str() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        ("boolean", Value::Number(n)) => match n.as_f64() {
            Some(f) if f == 1.0 => Some(Value::Bool(true)),
            Some(f) if f == 0.0 => Some(Value::Bool(false)),
            _ => None,
        },
        ("boolean", Value::Null) => Some(Value::Bool(false)),

        ("null", Value::String(s)) if s.is_empty() => Some(Value::Null),
        ("null", Value::Number(n)) if n.as_f64() == Some(0.0) => Some(Value::Null),
        ("null", Value::Bool(false)) => Some(Value::Null),

        _ => None,
    }
}

fn parse_integer(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Some(Value::from(i));
    }
    trimmed.parse::<u64>().ok().map(Value::from)
}

fn parse_number(raw: &str) -> Option<Value> {
    if let Some(integer) = parse_integer(raw) {
        return Some(integer);
    }
    raw.trim()
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}
