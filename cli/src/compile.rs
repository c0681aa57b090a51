#![deny(missing_docs)]

//! # Compile Command
//!
//! Compiles a contract into the schema set document.

use crate::error::{CliError, CliResult};
use oavk_core::{compile_contract, CompileOptions, OperationIdPolicy, SchemaSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Arguments for the compile command.
#[derive(clap::Args, Debug, Clone)]
pub struct CompileArgs {
    /// Path to the OpenAPI contract (YAML or JSON).
    #[clap(long, default_value = "openapi.yaml")]
    pub contract: PathBuf,

    /// Output path for the schema set. Prints to stdout when omitted.
    #[clap(long)]
    pub output: Option<PathBuf>,

    /// Derive `"<METHOD> <path>"` identifiers for operations without `operationId`.
    #[clap(long)]
    pub derive_operation_ids: bool,
}

/// Reads and compiles a contract file.
pub fn load_schema_set(contract: &Path, derive_operation_ids: bool) -> CliResult<SchemaSet> {
    if !contract.exists() {
        return Err(CliError::General(format!(
            "Contract file not found: {:?}",
            contract
        )));
    }

    let text = fs::read_to_string(contract)?;
    let options = CompileOptions {
        operation_ids: if derive_operation_ids {
            OperationIdPolicy::DeriveFromRoute
        } else {
            OperationIdPolicy::Require
        },
    };
    Ok(compile_contract(&text, &options)?)
}

/// Executes the compile command.
pub fn execute(args: &CompileArgs) -> CliResult<()> {
    let set = load_schema_set(&args.contract, args.derive_operation_ids)?;
    let rendered = serde_json::to_string_pretty(&set)
        .map_err(|e| CliError::General(format!("JSON serialization failed: {}", e)))?;

    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, rendered)?;
            tracing::info!(
                operations = set.operations.len(),
                output = %path.display(),
                "wrote schema set"
            );
        }
        None => println!("{}", rendered),
    }

    Ok(())
}
