#![deny(missing_docs)]

//! # Parameter Resolution
//!
//! Resolves OpenAPI Parameters (inline or `$ref`) into [`Parameter`]s and builds the
//! three per-location object schemas of a bundle: `params`, `query` and `headers`.

use crate::error::{AppResult, ContractError};
use crate::oas::refs::{resolve_component, rewrite_schema_refs};
use crate::oas::shims::{select_json_media, ShimComponents, ShimParameter};
use indexmap::IndexMap;
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use std::fmt;
use utoipa::openapi::RefOr;

/// The locations a parameter can be validated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamLocation {
    /// URL path segment, e.g. `/pets/{id}`.
    Path,
    /// Query string.
    Query,
    /// Request header.
    Header,
}

impl ParamLocation {
    /// Parses an OpenAPI `in` value. Anything outside path/query/header is `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "path" => Some(ParamLocation::Path),
            "query" => Some(ParamLocation::Query),
            "header" => Some(ParamLocation::Header),
            _ => None,
        }
    }
}

impl fmt::Display for ParamLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamLocation::Path => f.write_str("path"),
            ParamLocation::Query => f.write_str("query"),
            ParamLocation::Header => f.write_str("header"),
        }
    }
}

/// A resolved parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Where the value comes from.
    pub location: ParamLocation,
    /// Property name (lower-cased for headers).
    pub name: String,
    /// Whether the parameter must be present.
    pub required: bool,
    /// JSON Schema fragment for the value.
    pub schema: Value,
    /// Human description.
    pub description: Option<String>,
}

/// The three object schemas produced from a parameter list.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSchemas {
    /// Path parameters; unknown properties rejected.
    pub path: Value,
    /// Query parameters; unknown properties accepted.
    pub query: Value,
    /// Headers; unknown properties accepted.
    pub header: Value,
}

/// Resolves one level of parameter declarations (path item or operation).
///
/// Parameters located outside path/query/header are dropped.
/// A `(name, location)` pair may appear only once per level.
pub fn resolve_parameters(
    params: &[RefOr<ShimParameter>],
    components: Option<&ShimComponents>,
    definitions: &IndexMap<String, Value>,
    site: &str,
) -> AppResult<Vec<Parameter>> {
    let mut result = Vec::new();
    let mut seen = HashSet::new();

    for param_or_ref in params {
        let (param, ref_description) = match param_or_ref {
            RefOr::T(param) => (param.clone(), None),
            RefOr::Ref(r) => (
                resolve_component::<ShimParameter>(
                    &r.ref_location,
                    "parameters",
                    components.map(|c| &c.parameters),
                    site,
                )?,
                (!r.description.is_empty()).then(|| r.description.clone()),
            ),
        };

        let Some(location) = ParamLocation::parse(&param.parameter_in) else {
            tracing::debug!(
                site,
                name = %param.name,
                location = %param.parameter_in,
                "dropping parameter with unsupported location"
            );
            continue;
        };

        let name = match location {
            ParamLocation::Header => param.name.to_ascii_lowercase(),
            _ => param.name.clone(),
        };

        if !seen.insert((name.clone(), location)) {
            return Err(ContractError::DuplicateParameter {
                site: site.to_string(),
                name,
                location: location.to_string(),
            }
            .into());
        }

        let mut schema = parameter_schema(&param);
        rewrite_schema_refs(&mut schema, definitions, &format!("{} parameter '{}'", site, name))?;

        result.push(Parameter {
            location,
            name,
            required: param.required,
            schema,
            description: ref_description.or(param.description),
        });
    }

    Ok(result)
}

/// Picks the value schema of a parameter.
///
/// Preference: `schema`, then the JSON entry of `content`, then a schema built from
/// Swagger 2.0 `type`/`format`/`items`, otherwise `{}`.
fn parameter_schema(param: &ShimParameter) -> Value {
    if let Some(schema) = &param.schema {
        return schema.clone();
    }

    if let Some(schema) = param
        .content
        .as_ref()
        .and_then(select_json_media)
        .and_then(|media| media.schema.clone())
    {
        return schema;
    }

    let mut legacy = Map::new();
    if let Some(ty) = &param.schema_type {
        legacy.insert("type".into(), Value::String(ty.clone()));
    }
    if let Some(format) = &param.format {
        legacy.insert("format".into(), Value::String(format.clone()));
    }
    if let Some(items) = &param.items {
        legacy.insert("items".into(), items.clone());
    }
    Value::Object(legacy)
}

/// Merges path-level and method-level parameters.
///
/// Inheritance is additive: path-level parameters come first, method-level ones
/// are appended. When both levels declare the same `(name, location)`, the schema
/// builder lets the later (method-level) declaration win.
pub fn merge_parameters(inherited: &[Parameter], local: &[Parameter]) -> Vec<Parameter> {
    inherited.iter().chain(local.iter()).cloned().collect()
}

/// Builds an object schema shell with the given properties policy.
pub fn object_schema(additional_properties: bool) -> Value {
    json!({
        "additionalProperties": additional_properties,
        "type": "object",
        "required": [],
        "properties": {},
    })
}

/// Builds the `path`, `query` and `header` schemas from an ordered parameter list.
pub fn build_parameter_schemas(params: &[Parameter]) -> ParameterSchemas {
    let mut schemas = ParameterSchemas {
        path: object_schema(false),
        query: object_schema(true),
        header: object_schema(true),
    };

    for param in params {
        let target = match param.location {
            ParamLocation::Path => &mut schemas.path,
            ParamLocation::Query => &mut schemas.query,
            ParamLocation::Header => &mut schemas.header,
        };
        add_property(target, param);
    }

    schemas
}

fn add_property(object: &mut Value, param: &Parameter) {
    let mut property = Map::new();
    if let Some(description) = &param.description {
        property.insert("description".into(), Value::String(description.clone()));
    }
    property.insert("nullable".into(), Value::Bool(!param.required));
    // The parameter's own schema keys win over the generated ones.
    if let Value::Object(own) = &param.schema {
        for (key, value) in own {
            property.insert(key.clone(), value.clone());
        }
    }

    if let Some(properties) = object.get_mut("properties").and_then(Value::as_object_mut) {
        properties.insert(param.name.clone(), Value::Object(property));
    }

    if let Some(required) = object.get_mut("required").and_then(Value::as_array_mut) {
        let name = Value::String(param.name.clone());
        required.retain(|existing| existing != &name);
        if param.required {
            required.push(name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oas::shims::ShimMediaType;
    use pretty_assertions::assert_eq;
    use utoipa::openapi::Ref;

    fn shim(name: &str, location: &str, required: bool, schema: Value) -> RefOr<ShimParameter> {
        RefOr::T(ShimParameter {
            name: name.into(),
            parameter_in: location.into(),
            description: None,
            required,
            schema: Some(schema),
            content: None,
            schema_type: None,
            format: None,
            items: None,
        })
    }

    fn param(location: ParamLocation, name: &str, required: bool) -> Parameter {
        Parameter {
            location,
            name: name.into(),
            required,
            schema: json!({"type": "string"}),
            description: None,
        }
    }

    #[test]
    fn test_required_and_nullable_are_complementary() {
        let params = vec![
            param(ParamLocation::Query, "limit", false),
            param(ParamLocation::Query, "cursor", true),
            param(ParamLocation::Path, "id", true),
        ];
        let schemas = build_parameter_schemas(&params);

        assert_eq!(schemas.query["required"], json!(["cursor"]));
        assert_eq!(schemas.query["properties"]["limit"]["nullable"], json!(true));
        assert_eq!(schemas.query["properties"]["cursor"]["nullable"], json!(false));
        assert_eq!(schemas.path["required"], json!(["id"]));
        assert_eq!(schemas.path["properties"]["id"]["nullable"], json!(false));
    }

    #[test]
    fn test_additional_properties_policy() {
        let schemas = build_parameter_schemas(&[]);
        assert_eq!(schemas.path["additionalProperties"], json!(false));
        assert_eq!(schemas.query["additionalProperties"], json!(true));
        assert_eq!(schemas.header["additionalProperties"], json!(true));
        assert_eq!(schemas.path["properties"], json!({}));
    }

    #[test]
    fn test_parameter_schema_keys_win() {
        let mut p = param(ParamLocation::Query, "q", false);
        p.description = Some("generated".into());
        p.schema = json!({"type": "string", "description": "own", "nullable": false});
        let schemas = build_parameter_schemas(&[p]);
        assert_eq!(
            schemas.query["properties"]["q"],
            json!({"description": "own", "nullable": false, "type": "string"})
        );
    }

    #[test]
    fn test_unknown_locations_dropped_and_headers_lowercased() {
        let params = vec![
            shim("id", "path", true, json!({"type": "integer"})),
            shim("session", "cookie", true, json!({"type": "string"})),
            shim("payload", "body", true, json!({"type": "object"})),
            shim("X-Request-Id", "header", true, json!({"type": "string"})),
        ];
        let resolved = resolve_parameters(&params, None, &IndexMap::new(), "GET /pets").unwrap();
        let names: Vec<_> = resolved.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["id", "x-request-id"]);
    }

    #[test]
    fn test_duplicate_parameter_rejected() {
        let params = vec![
            shim("limit", "query", false, json!({})),
            shim("limit", "query", true, json!({})),
        ];
        let err = resolve_parameters(&params, None, &IndexMap::new(), "GET /pets").unwrap_err();
        assert!(err.to_string().contains("Duplicate parameter 'limit'"));
    }

    #[test]
    fn test_ref_parameter_resolved_once() {
        let mut components = ShimComponents::default();
        components.parameters.insert(
            "Limit".into(),
            json!({"name": "limit", "in": "query", "schema": {"type": "integer"}}),
        );
        let params = vec![RefOr::Ref(Ref::new("#/components/parameters/Limit"))];
        let resolved =
            resolve_parameters(&params, Some(&components), &IndexMap::new(), "GET /pets").unwrap();
        assert_eq!(resolved[0].name, "limit");
        assert_eq!(resolved[0].schema, json!({"type": "integer"}));
        assert!(!resolved[0].required);
    }

    #[test]
    fn test_content_and_legacy_schemas() {
        let mut content = IndexMap::new();
        content.insert(
            "application/json".to_string(),
            ShimMediaType {
                schema: Some(json!({"type": "object"})),
            },
        );
        let with_content = ShimParameter {
            name: "filter".into(),
            parameter_in: "query".into(),
            description: None,
            required: false,
            schema: None,
            content: Some(content),
            schema_type: None,
            format: None,
            items: None,
        };
        assert_eq!(parameter_schema(&with_content), json!({"type": "object"}));

        let legacy = ShimParameter {
            content: None,
            schema_type: Some("integer".into()),
            format: Some("int64".into()),
            ..with_content
        };
        assert_eq!(
            parameter_schema(&legacy),
            json!({"type": "integer", "format": "int64"})
        );
    }

    #[test]
    fn test_merge_is_additive_and_local_wins() {
        let inherited = vec![param(ParamLocation::Path, "id", true)];
        let mut local_id = param(ParamLocation::Path, "id", true);
        local_id.schema = json!({"type": "integer"});
        let local = vec![local_id, param(ParamLocation::Query, "verbose", false)];

        let merged = merge_parameters(&inherited, &local);
        assert_eq!(merged.len(), 3);

        let schemas = build_parameter_schemas(&merged);
        assert_eq!(schemas.path["properties"]["id"]["type"], json!("integer"));
        assert_eq!(schemas.path["required"], json!(["id"]));
    }
}
