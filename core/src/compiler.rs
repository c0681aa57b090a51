#![deny(missing_docs)]

//! # Operation Schema Compiler
//!
//! Walks every path and method of a contract and assembles one [`SchemaBundle`]
//! per operation. Any problem aborts the whole compile; a partial [`SchemaSet`]
//! is never returned.

use crate::bundle::{OperationId, SchemaBundle, SchemaSet};
use crate::error::{AppError, AppResult, ContractError};
use crate::oas::refs::build_definitions;
use crate::oas::resolver::{
    build_parameter_schemas, merge_parameters, resolve_parameters, resolve_request_body,
    resolve_responses,
};
use crate::oas::shims::{ShimComponents, ShimContract, ShimOperation, ShimPathItem};
use indexmap::IndexMap;
use serde_json::Value;
use utoipa::openapi::RefOr;

/// How operations without an `operationId` are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperationIdPolicy {
    /// Missing identifiers abort the compile.
    #[default]
    Require,
    /// Missing identifiers become `"<METHOD> <path>"`.
    DeriveFromRoute,
}

/// Compiler configuration.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Policy for operations without an `operationId`.
    pub operation_ids: OperationIdPolicy,
}

/// Parses contract text (YAML or JSON) into the shim layer.
pub fn parse_contract(text: &str) -> AppResult<ShimContract> {
    let contract: ShimContract = serde_yaml::from_str(text)
        .map_err(|e| AppError::Parse(format!("Failed to parse OpenAPI document: {}", e)))?;

    match contract.openapi.as_deref() {
        Some(version) if !version.starts_with("3.") => Err(AppError::Parse(format!(
            "Unsupported OpenAPI version: {}. Only 3.x is supported.",
            version
        ))),
        Some(_) => Ok(contract),
        None => {
            tracing::debug!("contract declares no 'openapi' version, assuming 3.x");
            Ok(contract)
        }
    }
}

/// Parses and compiles contract text.
pub fn compile_contract(text: &str, options: &CompileOptions) -> AppResult<SchemaSet> {
    let contract = parse_contract(text)?;
    compile_document(&contract, options)
}

/// Compiles an already parsed contract into a [`SchemaSet`].
pub fn compile_document(contract: &ShimContract, options: &CompileOptions) -> AppResult<SchemaSet> {
    let components = contract.components.as_ref();
    let definitions = match components {
        Some(c) => build_definitions(&c.schemas)?,
        None => IndexMap::new(),
    };

    let mut operations: IndexMap<OperationId, SchemaBundle> = IndexMap::new();

    for (path, item) in &contract.paths.items {
        let item = match item {
            RefOr::T(item) => item,
            RefOr::Ref(r) => {
                return Err(ContractError::UnsupportedRef {
                    site: format!("paths.{}", path),
                    reference: r.ref_location.clone(),
                    reason: "path item references are not supported".into(),
                }
                .into())
            }
        };

        compile_path_item(path, item, components, &definitions, options, &mut operations)?;
    }

    tracing::info!(
        operations = operations.len(),
        definitions = definitions.len(),
        "compiled contract"
    );

    Ok(SchemaSet {
        operations,
        definitions,
    })
}

fn compile_path_item(
    path: &str,
    item: &ShimPathItem,
    components: Option<&ShimComponents>,
    definitions: &IndexMap<String, Value>,
    options: &CompileOptions,
    operations: &mut IndexMap<OperationId, SchemaBundle>,
) -> AppResult<()> {
    let inherited = resolve_parameters(
        &item.parameters,
        components,
        definitions,
        &format!("paths.{}", path),
    )?;

    for (method, operation) in item.operations() {
        let id = operation_id(method, path, operation, options)?;
        if operations.contains_key(&id) {
            return Err(ContractError::DuplicateOperationId(id.to_string()).into());
        }

        let site = format!("{} {}", method.to_ascii_uppercase(), path);
        let local = resolve_parameters(&operation.parameters, components, definitions, &site)?;
        let params = build_parameter_schemas(&merge_parameters(&inherited, &local));
        let request_body = resolve_request_body(
            operation.request_body.as_ref(),
            components,
            definitions,
            &site,
        )?;
        let response_body =
            resolve_responses(id.as_str(), &operation.responses, components, definitions)?;

        tracing::debug!(
            operation = %id,
            route = %site,
            responses = response_body.len(),
            has_body = !request_body.is_no_body(),
            "compiled operation"
        );

        operations.insert(
            id,
            SchemaBundle {
                params: params.path,
                query: params.query,
                headers: params.header,
                request_body,
                response_body,
                description: operation.description.clone(),
            },
        );
    }

    Ok(())
}

fn operation_id(
    method: &str,
    path: &str,
    operation: &ShimOperation,
    options: &CompileOptions,
) -> AppResult<OperationId> {
    match (&operation.operation_id, options.operation_ids) {
        (Some(id), _) if !id.trim().is_empty() => Ok(OperationId::new(id.clone())),
        (_, OperationIdPolicy::DeriveFromRoute) => Ok(OperationId::from_route(method, path)),
        (_, OperationIdPolicy::Require) => Err(ContractError::MissingOperationId {
            method: method.to_ascii_uppercase(),
            path: path.to_string(),
        }
        .into()),
    }
}
