#![deny(missing_docs)]

//! # Validation Engine
//!
//! The boundary between the runtime and the schema-validation engine.
//!
//! - [`SchemaEngine`] turns a schema into a [`Predicate`].
//! - [`Predicate`] checks (and, depending on [`EngineOptions`], coerces) one value.
//!
//! [`JsonSchemaEngine`] is the default implementation, built on the `jsonschema`
//! crate (Draft 2020-12), with OpenAPI 3.0 keywords normalized first.

use crate::oas::refs::pointer_to_dotted;
use crate::runtime::coerce::Coercer;
use crate::runtime::dialect::normalize_dialect;
use crate::runtime::failure::Issue;
use derive_more::Display;
use jsonschema::error::{TypeKind, ValidationErrorKind};
use jsonschema::primitive_type::PrimitiveType;
use jsonschema::{Draft, Validator};
use serde_json::Value;

/// The engine refused a schema.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("{_0}")]
pub struct EngineError(pub String);

impl std::error::Error for EngineError {}

/// A compiled validation predicate.
pub trait Predicate: Send + Sync {
    /// Checks `data`, possibly rewriting it in place (coercion, defaults).
    fn check(&self, data: &mut Value) -> Result<(), Vec<Issue>>;
}

/// Compiles schemas into predicates.
pub trait SchemaEngine: Send + Sync {
    /// Compiles one root schema. `#/...` references resolve against `schema` itself.
    fn compile(&self, schema: &Value) -> Result<Box<dyn Predicate>, EngineError>;
}

/// How weakly-typed transport values are coerced before validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoercionMode {
    /// Values are validated as given.
    Off,
    /// Scalars convert between string, number, integer, boolean and null.
    Scalars,
    /// Like `Scalars`, plus scalar <-> single-element array.
    #[default]
    Array,
}

/// Engine configuration, fixed for the engine's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Type coercion mode.
    pub coerce: CoercionMode,
    /// Fill missing, `null` or `""` properties from the schema's `default`.
    pub use_defaults: bool,
    /// Assert `format` keywords.
    pub validate_formats: bool,
    /// Report every issue instead of stopping at the first one.
    pub all_errors: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            coerce: CoercionMode::Array,
            use_defaults: true,
            validate_formats: true,
            all_errors: false,
        }
    }
}

/// [`SchemaEngine`] backed by the `jsonschema` crate.
#[derive(Debug, Clone, Default)]
pub struct JsonSchemaEngine {
    options: EngineOptions,
}

impl JsonSchemaEngine {
    /// Creates an engine with the given options.
    pub fn new(options: EngineOptions) -> Self {
        Self { options }
    }

    /// The options every predicate of this engine is built with.
    pub fn options(&self) -> EngineOptions {
        self.options
    }
}

impl SchemaEngine for JsonSchemaEngine {
    fn compile(&self, schema: &Value) -> Result<Box<dyn Predicate>, EngineError> {
        let mut normalized = schema.clone();
        normalize_dialect(&mut normalized);

        let mut opts = jsonschema::options();
        opts.with_draft(Draft::Draft202012);
        opts.should_validate_formats(self.options.validate_formats);

        let validator = opts
            .build(&normalized)
            .map_err(|e| EngineError(e.to_string()))?;

        Ok(Box::new(JsonSchemaPredicate {
            validator,
            coercer: Coercer::new(normalized, self.options),
            all_errors: self.options.all_errors,
        }))
    }
}

struct JsonSchemaPredicate {
    validator: Validator,
    coercer: Coercer,
    all_errors: bool,
}

impl Predicate for JsonSchemaPredicate {
    fn check(&self, data: &mut Value) -> Result<(), Vec<Issue>> {
        self.coercer.apply(data);

        let limit = if self.all_errors { usize::MAX } else { 1 };
        let issues: Vec<Issue> = self
            .validator
            .iter_errors(data)
            .take(limit)
            .map(|e| {
                let path = pointer_to_dotted(&e.instance_path.to_string());
                let message = describe(&e.kind).unwrap_or_else(|| e.to_string());
                Issue::new(path, message)
            })
            .collect();

        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }
}

/// Renders the common error kinds in the `must ...` style.
fn describe(kind: &ValidationErrorKind) -> Option<String> {
    let message = match kind {
        ValidationErrorKind::Required { property } => {
            let name = property
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| property.to_string());
            format!("must have required property '{}'", name)
        }
        ValidationErrorKind::Type {
            kind: TypeKind::Single(ty),
        } => format!("must be {}", ty),
        // Drops the `null` that `nullable` adds.
        ValidationErrorKind::Type {
            kind: TypeKind::Multiple(types),
        } => {
            let names: Vec<String> = (*types)
                .into_iter()
                .filter(|ty| *ty != PrimitiveType::Null)
                .map(|ty| ty.to_string())
                .collect();
            format!("must be {}", names.join(","))
        }
        ValidationErrorKind::AdditionalProperties { .. } => {
            "must NOT have additional properties".to_string()
        }
        ValidationErrorKind::Enum { .. } => "must be equal to one of the allowed values".to_string(),
        ValidationErrorKind::Not { .. } => "must NOT be valid".to_string(),
        ValidationErrorKind::Format { format } => format!("must match format \"{}\"", format),
        ValidationErrorKind::Pattern { pattern } => format!("must match pattern \"{}\"", pattern),
        ValidationErrorKind::Minimum { limit } => format!("must be >= {}", limit),
        ValidationErrorKind::Maximum { limit } => format!("must be <= {}", limit),
        ValidationErrorKind::MinLength { limit } => {
            format!("must NOT have fewer than {} characters", limit)
        }
        ValidationErrorKind::MaxLength { limit } => {
            format!("must NOT have more than {} characters", limit)
        }
        _ => return None,
    };
    Some(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn check(schema: Value, mut data: Value) -> (Result<(), Vec<Issue>>, Value) {
        let predicate = JsonSchemaEngine::default().compile(&schema).unwrap();
        let result = predicate.check(&mut data);
        (result, data)
    }

    fn messages(result: Result<(), Vec<Issue>>) -> Vec<String> {
        result
            .unwrap_err()
            .into_iter()
            .map(|i| match i.path {
                Some(p) => format!("{}: {}", p, i.message),
                None => i.message,
            })
            .collect()
    }

    #[test]
    fn test_valid_value_passes() {
        let schema = json!({"type": "object", "properties": {"name": {"type": "string"}}});
        let (result, _) = check(schema, json!({"name": "Rex"}));
        assert!(result.is_ok());
    }

    #[test]
    fn test_required_message() {
        let schema = json!({"type": "object", "required": ["name"]});
        let (result, _) = check(schema, json!({}));
        assert_eq!(messages(result), vec!["must have required property 'name'"]);
    }

    #[test]
    fn test_type_message_has_dotted_path() {
        let schema = json!({
            "type": "object",
            "properties": {"owner": {"type": "object", "properties": {"age": {"type": "integer"}}}}
        });
        let (result, _) = check(schema, json!({"owner": {"age": "old"}}));
        assert_eq!(messages(result), vec!["owner.age: must be integer"]);
    }

    #[test]
    fn test_first_issue_only_unless_all_errors() {
        let schema = json!({"type": "object", "required": ["code", "message"]});
        let (result, _) = check(schema.clone(), json!({}));
        assert_eq!(messages(result), vec!["must have required property 'code'"]);

        let engine = JsonSchemaEngine::new(EngineOptions {
            all_errors: true,
            ..EngineOptions::default()
        });
        let predicate = engine.compile(&schema).unwrap();
        assert_eq!(
            messages(predicate.check(&mut json!({}))),
            vec![
                "must have required property 'code'",
                "must have required property 'message'"
            ]
        );
    }

    #[test]
    fn test_additional_properties_and_not() {
        let closed = json!({"type": "object", "additionalProperties": false});
        let (result, _) = check(closed, json!({"x": 1}));
        assert_eq!(messages(result), vec!["must NOT have additional properties"]);

        let nothing = json!({"description": "No request body", "not": {}});
        let (result, _) = check(nothing, json!({"x": 1}));
        assert_eq!(messages(result), vec!["must NOT be valid"]);
    }

    #[test]
    fn test_coercion_before_validation() {
        let schema = json!({
            "type": "object",
            "properties": {"tag": {"type": "string"}, "limit": {"type": "integer"}}
        });
        let (result, data) = check(schema, json!({"tag": 9, "limit": "10"}));
        assert!(result.is_ok());
        assert_eq!(data, json!({"tag": "9", "limit": 10}));
    }

    #[test]
    fn test_coercion_off_reports_types() {
        let engine = JsonSchemaEngine::new(EngineOptions {
            coerce: CoercionMode::Off,
            ..EngineOptions::default()
        });
        let predicate = engine.compile(&json!({"type": "integer"})).unwrap();
        let mut data = json!("10");
        assert!(predicate.check(&mut data).is_err());
        assert_eq!(data, json!("10"));
    }

    #[test]
    fn test_nullable_dialect() {
        let schema = json!({"type": "string", "nullable": true});
        let (result, _) = check(schema, Value::Null);
        assert!(result.is_ok());
    }

    #[test]
    fn test_nullable_type_message_omits_null() {
        let schema = json!({
            "type": "object",
            "properties": {"limit": {"type": "integer", "nullable": true}}
        });
        let (result, _) = check(schema, json!({"limit": "abc"}));
        assert_eq!(messages(result), vec!["limit: must be integer"]);

        let (result, _) = check(json!({"type": ["string", "integer", "null"]}), json!({"a": 1}));
        let message = messages(result).remove(0);
        assert!(message.starts_with("must be "));
        assert!(message.contains("integer") && message.contains("string"));
        assert!(!message.contains("null"));
    }

    #[test]
    fn test_definitions_refs_resolve() {
        let schema = json!({
            "$ref": "#/definitions/Pet",
            "definitions": {"Pet": {"type": "object", "required": ["name"]}}
        });
        let (result, _) = check(schema.clone(), json!({}));
        assert_eq!(messages(result), vec!["must have required property 'name'"]);
        let (result, _) = check(schema, json!({"name": "Rex"}));
        assert!(result.is_ok());
    }

    #[test]
    fn test_format_assertion_toggle() {
        let schema = json!({"type": "string", "format": "date-time"});
        let (result, _) = check(schema.clone(), json!("not a date"));
        assert!(result.is_err());

        let lax = JsonSchemaEngine::new(EngineOptions {
            validate_formats: false,
            ..EngineOptions::default()
        });
        let predicate = lax.compile(&schema).unwrap();
        assert!(predicate.check(&mut json!("not a date")).is_ok());
    }

    #[test]
    fn test_invalid_schema_is_engine_error() {
        let err = JsonSchemaEngine::default()
            .compile(&json!({"type": 12}))
            .err()
            .unwrap();
        assert!(!err.to_string().is_empty());
    }
}
