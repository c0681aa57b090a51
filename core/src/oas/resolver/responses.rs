#![deny(missing_docs)]

//! # Response Resolution
//!
//! Normalizes an operation's `responses` map into `StatusKey -> Schema`.

use crate::bundle::StatusKey;
use crate::error::{AppError, AppResult, ContractError};
use crate::oas::refs::{resolve_component, rewrite_schema_refs};
use crate::oas::shims::{select_json_media, ShimComponents, ShimResponse};
use indexmap::IndexMap;
use serde_json::{json, Value};
use utoipa::openapi::RefOr;

/// Description of the schema used when a response declares no JSON body.
pub const UNKNOWN_RESPONSE_BODY: &str = "Unknown response body";

/// One normalized response declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEntry {
    /// Normalized status key.
    pub status: StatusKey,
    /// Response description, if any.
    pub description: Option<String>,
    /// JSON body schema, or the placeholder accepting anything.
    pub body: Value,
}

/// Schema for responses without a JSON body; it accepts any value.
pub fn unknown_body() -> Value {
    json!({ "description": UNKNOWN_RESPONSE_BODY })
}

/// Resolves every response of an operation, in declaration order.
///
/// Fails when the map holds no status entries, a key is malformed, or two keys
/// normalize to the same [`StatusKey`]. `x-` extension keys and `null` entries
/// are skipped.
pub fn resolve_response_entries(
    operation: &str,
    responses: &IndexMap<String, Value>,
    components: Option<&ShimComponents>,
    definitions: &IndexMap<String, Value>,
) -> AppResult<Vec<ResponseEntry>> {
    let mut entries: Vec<ResponseEntry> = Vec::new();

    for (raw_key, raw) in responses {
        if raw_key.starts_with("x-") || raw.is_null() {
            continue;
        }

        let status: StatusKey = raw_key.parse().map_err(|_| ContractError::InvalidStatusKey {
            operation: operation.to_string(),
            key: raw_key.clone(),
        })?;

        if entries.iter().any(|e| e.status == status) {
            return Err(ContractError::DuplicateStatusKey {
                operation: operation.to_string(),
                key: status.to_string(),
            }
            .into());
        }

        let site = format!("{} response '{}'", operation, raw_key);
        let response = parse_response(raw, components, &site)?;

        let body = match select_json_media(&response.content).and_then(|m| m.schema.clone()) {
            Some(mut schema) => {
                rewrite_schema_refs(&mut schema, definitions, &site)?;
                schema
            }
            None => unknown_body(),
        };

        entries.push(ResponseEntry {
            status,
            description: response.description,
            body,
        });
    }

    if entries.is_empty() {
        return Err(ContractError::EmptyResponses {
            operation: operation.to_string(),
        }
        .into());
    }

    Ok(entries)
}

/// Resolves the `responseBody` map of a bundle.
pub fn resolve_responses(
    operation: &str,
    responses: &IndexMap<String, Value>,
    components: Option<&ShimComponents>,
    definitions: &IndexMap<String, Value>,
) -> AppResult<IndexMap<StatusKey, Value>> {
    Ok(
        resolve_response_entries(operation, responses, components, definitions)?
            .into_iter()
            .map(|entry| (entry.status, entry.body))
            .collect(),
    )
}

fn parse_response(
    raw: &Value,
    components: Option<&ShimComponents>,
    site: &str,
) -> AppResult<ShimResponse> {
    let parsed: RefOr<ShimResponse> = serde_json::from_value(raw.clone())
        .map_err(|e| AppError::Parse(format!("Failed to parse {}: {}", site, e)))?;

    match parsed {
        RefOr::T(response) => Ok(response),
        RefOr::Ref(r) => resolve_component(
            &r.ref_location,
            "responses",
            components.map(|c| &c.responses),
            site,
        ),
    }
}
