#![deny(missing_docs)]

//! # Validate Command
//!
//! Validates one JSON payload against one field of one operation.

use crate::compile::load_schema_set;
use crate::error::{CliError, CliResult};
use oavk_core::{AppError, ValidatorSession};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

/// The part of an exchange to validate.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldArg {
    /// Path parameters object.
    Params,
    /// Query object.
    Query,
    /// Header object.
    Headers,
    /// Request body.
    RequestBody,
    /// Response body (needs `--status`).
    ResponseBody,
}

/// Arguments for the validate command.
#[derive(clap::Args, Debug, Clone)]
pub struct ValidateArgs {
    /// Path to the OpenAPI contract (YAML or JSON).
    #[clap(long, default_value = "openapi.yaml")]
    pub contract: PathBuf,

    /// Operation identifier.
    #[clap(long)]
    pub operation: String,

    /// Field to validate.
    #[clap(long, value_enum)]
    pub field: FieldArg,

    /// Response status code, for `response-body`.
    #[clap(long)]
    pub status: Option<u16>,

    /// JSON file holding the payload. Without it the payload is absent.
    #[clap(long)]
    pub data: Option<PathBuf>,

    /// Derive `"<METHOD> <path>"` identifiers for operations without `operationId`.
    #[clap(long)]
    pub derive_operation_ids: bool,
}

/// Validates the payload and returns it after coercion and defaults.
pub fn run(args: &ValidateArgs) -> CliResult<Option<Value>> {
    let set = load_schema_set(&args.contract, args.derive_operation_ids)?;
    let session = Arc::new(ValidatorSession::with_defaults(set));
    let validators = session.operation(&args.operation)?;

    let mut payload = match &args.data {
        Some(path) => Some(
            serde_json::from_str::<Value>(&fs::read_to_string(path)?)
                .map_err(|e| CliError::General(format!("Invalid JSON in {:?}: {}", path, e)))?,
        ),
        None => None,
    };

    let result = match args.field {
        FieldArg::Params => {
            let mut data = payload.take().unwrap_or_else(empty_object);
            validators.params(&mut data).map(|_| Some(data))
        }
        FieldArg::Query => {
            let mut data = payload.take().unwrap_or_else(empty_object);
            validators.query(&mut data).map(|_| Some(data))
        }
        FieldArg::Headers => {
            let mut data = payload.take().unwrap_or_else(empty_object);
            validators.headers(&mut data).map(|_| Some(data))
        }
        FieldArg::RequestBody => validators.request_body(payload.as_mut()).map(|_| payload),
        FieldArg::ResponseBody => {
            let status = args.status.ok_or_else(|| {
                CliError::General("--status is required for response-body".into())
            })?;
            let mut data = payload.take().unwrap_or(Value::Null);
            validators.response_body(&mut data, status).map(|_| Some(data))
        }
    };

    result.map_err(|e| match e {
        AppError::Validation(v) => CliError::Invalid(v.message()),
        other => CliError::App(other),
    })
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}

/// Executes the validate command, printing `valid` on success.
pub fn execute(args: &ValidateArgs) -> CliResult<()> {
    let data = run(args)?;
    tracing::debug!(operation = %args.operation, data = ?data, "payload accepted");
    println!("valid");
    Ok(())
}
