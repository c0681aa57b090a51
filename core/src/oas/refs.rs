#![deny(missing_docs)]

//! # Reference Utilities
//!
//! Single-level `$ref` resolution.
//!
//! Two kinds of references are supported:
//! - Operation-level objects (parameters, request bodies, responses) may point at
//!   `#/components/{section}/{name}`; the target is inlined once and must not be a
//!   `$ref` itself.
//! - Schemas may point at `#/components/schemas/{name}`; those are rewritten to
//!   `#/definitions/{name}` and resolved by the validation engine against the
//!   schema set's `definitions` namespace.
//!
//! Nothing is ever fetched. External documents are a hard compile error.

use crate::error::{AppError, AppResult, ContractError};
use indexmap::IndexMap;
use percent_encoding::percent_decode_str;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

/// Prefix of rewritten schema references.
pub const DEFINITIONS_PREFIX: &str = "#/definitions/";

/// Where a `$ref` points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefTarget {
    /// `#/components/{section}/{name}`.
    Component {
        /// Component section (`schemas`, `parameters`...).
        section: String,
        /// Decoded component name.
        name: String,
    },
    /// `#/definitions/{name}` (already rewritten).
    Definition(String),
    /// Any other pointer into the current document.
    OtherLocal,
    /// Another document, absolute or relative.
    External,
}

/// Classifies a raw `$ref` string.
pub fn classify(reference: &str) -> RefTarget {
    // Absolute URIs and relative file references both leave this document.
    if !reference.starts_with('#') {
        return RefTarget::External;
    }

    let pointer = reference.trim_start_matches('#').trim_start_matches('/');
    let segments: Vec<&str> = pointer.split('/').collect();

    match segments.as_slice() {
        ["components", section, name] if !name.is_empty() => RefTarget::Component {
            section: decode_pointer_segment(section),
            name: decode_pointer_segment(name),
        },
        ["definitions", name] if !name.is_empty() => {
            RefTarget::Definition(decode_pointer_segment(name))
        }
        _ => RefTarget::OtherLocal,
    }
}

/// Describes why a reference is external, for error messages.
fn external_reason(reference: &str) -> String {
    match Url::parse(reference) {
        Ok(url) => format!("external document '{}' is not fetched", url),
        Err(_) => "relative document references are not supported".to_string(),
    }
}

/// Decodes a JSON Pointer segment (handles `~1` and `~0`).
pub(crate) fn decode_pointer_segment(segment: &str) -> String {
    let decoded = segment.replace("~1", "/").replace("~0", "~");
    percent_decode_str(&decoded)
        .decode_utf8_lossy()
        .into_owned()
}

/// Converts an instance JSON Pointer (`/a/0/b`) to dotted form (`a.0.b`).
///
/// The document root yields `None`.
pub fn pointer_to_dotted(pointer: &str) -> Option<String> {
    let trimmed = pointer.trim_start_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    Some(
        trimmed
            .split('/')
            .map(decode_pointer_segment)
            .collect::<Vec<_>>()
            .join("."),
    )
}

fn unsupported(site: &str, reference: &str, reason: impl Into<String>) -> AppError {
    ContractError::UnsupportedRef {
        site: site.to_string(),
        reference: reference.to_string(),
        reason: reason.into(),
    }
    .into()
}

/// Resolves a `$ref` to an entry of one `components` section and deserializes it.
///
/// The target must exist and must not itself be a `$ref`.
pub fn resolve_component<T: DeserializeOwned>(
    reference: &str,
    section: &str,
    entries: Option<&IndexMap<String, Value>>,
    site: &str,
) -> AppResult<T> {
    let name = match classify(reference) {
        RefTarget::Component { section: s, name } if s == section => name,
        RefTarget::External => return Err(unsupported(site, reference, external_reason(reference))),
        _ => {
            return Err(unsupported(
                site,
                reference,
                format!("expected a reference into components.{}", section),
            ))
        }
    };

    let target = entries.and_then(|e| e.get(&name)).ok_or_else(|| {
        unsupported(
            site,
            reference,
            format!("components.{} has no entry '{}'", section, name),
        )
    })?;

    if target.get("$ref").is_some() {
        return Err(unsupported(
            site,
            reference,
            "reference chains deeper than one level are not supported",
        ));
    }

    serde_json::from_value(target.clone()).map_err(|e| {
        AppError::Parse(format!(
            "Failed to parse components.{}.{} (referenced at {}): {}",
            section, name, site, e
        ))
    })
}

/// Keywords whose value is a map of name -> subschema.
pub(crate) const SCHEMA_MAP_KEYWORDS: [&str; 5] = [
    "properties",
    "patternProperties",
    "definitions",
    "$defs",
    "dependentSchemas",
];

/// Keywords whose value is a list of subschemas.
pub(crate) const SCHEMA_LIST_KEYWORDS: [&str; 4] = ["allOf", "anyOf", "oneOf", "prefixItems"];

/// Keywords whose value is a single subschema (or, for `items`, possibly a list).
pub(crate) const SCHEMA_KEYWORDS: [&str; 11] = [
    "items",
    "additionalItems",
    "additionalProperties",
    "not",
    "contains",
    "if",
    "then",
    "else",
    "propertyNames",
    "unevaluatedItems",
    "unevaluatedProperties",
];

/// Rewrites every schema `$ref` below `schema` into the definitions namespace.
///
/// `#/components/schemas/X` becomes `#/definitions/X`. Targets must exist in
/// `definitions`. Any other reference is rejected. Only subschema positions are
/// walked, so `enum`/`default`/`example` data is never touched.
pub fn rewrite_schema_refs(
    schema: &mut Value,
    definitions: &IndexMap<String, Value>,
    site: &str,
) -> Result<(), ContractError> {
    let Value::Object(map) = schema else {
        return Ok(());
    };

    if let Some(Value::String(reference)) = map.get("$ref") {
        let reference = reference.clone();
        let name = match classify(&reference) {
            RefTarget::Component { section, name } if section == "schemas" => name,
            RefTarget::Definition(name) => name,
            RefTarget::External => {
                return Err(ContractError::UnsupportedRef {
                    site: site.to_string(),
                    reason: external_reason(&reference),
                    reference,
                })
            }
            _ => {
                return Err(ContractError::UnsupportedRef {
                    site: site.to_string(),
                    reference,
                    reason: "schemas may only reference components.schemas".into(),
                })
            }
        };
        if !definitions.contains_key(&name) {
            return Err(ContractError::UnsupportedRef {
                site: site.to_string(),
                reference,
                reason: format!("components.schemas has no entry '{}'", name),
            });
        }
        map.insert(
            "$ref".to_string(),
            Value::String(format!("{}{}", DEFINITIONS_PREFIX, name)),
        );
    }

    for (key, child) in map.iter_mut() {
        let key = key.as_str();
        if SCHEMA_MAP_KEYWORDS.contains(&key) {
            if let Value::Object(named) = child {
                for sub in named.values_mut() {
                    rewrite_schema_refs(sub, definitions, site)?;
                }
            }
        } else if SCHEMA_LIST_KEYWORDS.contains(&key) || SCHEMA_KEYWORDS.contains(&key) {
            match child {
                Value::Array(list) => {
                    for sub in list {
                        rewrite_schema_refs(sub, definitions, site)?;
                    }
                }
                sub => rewrite_schema_refs(sub, definitions, site)?,
            }
        }
    }
    Ok(())
}

/// Builds the `definitions` namespace from `components.schemas`.
///
/// A definition that is nothing but a `$ref` to another one is an alias chain
/// and is rejected; references nested inside a definition are rewritten.
pub fn build_definitions(
    schemas: &IndexMap<String, Value>,
) -> Result<IndexMap<String, Value>, ContractError> {
    let mut definitions = schemas.clone();
    let names: Vec<String> = definitions.keys().cloned().collect();

    for name in names {
        let site = format!("components.schemas.{}", name);
        if let Some(Value::String(reference)) = schemas[&name].get("$ref") {
            return Err(ContractError::UnsupportedRef {
                site,
                reference: reference.clone(),
                reason: "reference chains deeper than one level are not supported".into(),
            });
        }
        let mut schema = definitions[&name].clone();
        rewrite_schema_refs(&mut schema, schemas, &site)?;
        definitions.insert(name, schema);
    }

    Ok(definitions)
}
