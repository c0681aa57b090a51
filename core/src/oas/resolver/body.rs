#![deny(missing_docs)]

//! # Body Resolution
//!
//! Extracts the JSON request body schema of an operation, or the no-body marker.

use crate::bundle::RequestBodySchema;
use crate::error::AppResult;
use crate::oas::refs::{resolve_component, rewrite_schema_refs};
use crate::oas::shims::{select_json_media, ShimComponents, ShimRequestBody};
use indexmap::IndexMap;
use serde_json::Value;
use utoipa::openapi::RefOr;

/// Resolves the request body slot of a bundle.
///
/// - No declaration -> [`RequestBodySchema::NoBody`].
/// - A declaration with a JSON media type -> its schema (refs rewritten).
/// - A declaration with only non-JSON media types -> treated as absent.
pub fn resolve_request_body(
    body: Option<&RefOr<ShimRequestBody>>,
    components: Option<&ShimComponents>,
    definitions: &IndexMap<String, Value>,
    site: &str,
) -> AppResult<RequestBodySchema> {
    let Some(body) = body else {
        return Ok(RequestBodySchema::NoBody);
    };

    let resolved;
    let body = match body {
        RefOr::T(b) => b,
        RefOr::Ref(r) => {
            resolved = resolve_component::<ShimRequestBody>(
                &r.ref_location,
                "requestBodies",
                components.map(|c| &c.request_bodies),
                site,
            )?;
            &resolved
        }
    };

    let Some(mut schema) = select_json_media(&body.content).and_then(|m| m.schema.clone()) else {
        tracing::debug!(
            site,
            media_types = ?body.content.keys().collect::<Vec<_>>(),
            "request body has no JSON schema, treating as absent"
        );
        return Ok(RequestBodySchema::NoBody);
    };

    rewrite_schema_refs(&mut schema, definitions, &format!("{} requestBody", site))?;
    Ok(RequestBodySchema::Json(schema))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oas::shims::ShimMediaType;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use utoipa::openapi::Ref;

    fn body_with(media_type: &str, schema: Value) -> ShimRequestBody {
        let mut content = IndexMap::new();
        content.insert(
            media_type.to_string(),
            ShimMediaType {
                schema: Some(schema),
            },
        );
        ShimRequestBody {
            description: None,
            content,
            required: true,
        }
    }

    fn pet_definitions() -> IndexMap<String, Value> {
        let mut defs = IndexMap::new();
        defs.insert("NewPet".to_string(), json!({"type": "object"}));
        defs
    }

    #[test]
    fn test_absent_body_is_marker() {
        let resolved = resolve_request_body(None, None, &IndexMap::new(), "GET /pets").unwrap();
        assert_eq!(resolved, RequestBodySchema::NoBody);
        assert_eq!(
            resolved.to_schema(),
            json!({"description": "No request body", "not": {}})
        );
    }

    #[test]
    fn test_extract_json_body() {
        let body = RefOr::T(body_with(
            "application/json",
            json!({"$ref": "#/components/schemas/NewPet"}),
        ));
        let resolved =
            resolve_request_body(Some(&body), None, &pet_definitions(), "POST /pets").unwrap();
        assert_eq!(
            resolved,
            RequestBodySchema::Json(json!({"$ref": "#/definitions/NewPet"}))
        );
    }

    #[test]
    fn test_non_json_body_is_absent() {
        let body = RefOr::T(body_with("multipart/form-data", json!({"type": "object"})));
        let resolved = resolve_request_body(Some(&body), None, &IndexMap::new(), "POST /upload")
            .unwrap();
        assert!(resolved.is_no_body());
    }

    #[test]
    fn test_ref_body_resolved_from_components() {
        let mut components = ShimComponents::default();
        components.request_bodies.insert(
            "PetBody".into(),
            json!({"content": {"application/json": {"schema": {"type": "object", "required": ["name"]}}}}),
        );
        let body = RefOr::Ref(Ref::new("#/components/requestBodies/PetBody"));
        let resolved =
            resolve_request_body(Some(&body), Some(&components), &IndexMap::new(), "POST /pets")
                .unwrap();
        assert_eq!(
            resolved,
            RequestBodySchema::Json(json!({"type": "object", "required": ["name"]}))
        );
    }

    #[test]
    fn test_ref_body_missing_target() {
        let body = RefOr::Ref(Ref::new("#/components/requestBodies/Nope"));
        let err = resolve_request_body(Some(&body), None, &IndexMap::new(), "POST /pets")
            .unwrap_err();
        assert!(err.to_string().contains("has no entry 'Nope'"));
    }
}
