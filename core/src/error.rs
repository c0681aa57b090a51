//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace, and the
//! `ContractError` taxonomy for contracts that cannot be compiled.

use crate::runtime::engine::EngineError;
use crate::runtime::failure::{MissingResponseSchema, ValidationError};
use derive_more::{Display, From};

/// HTTP status hint for request/response validation failures.
pub const UNPROCESSABLE_ENTITY: u16 = 422;

/// HTTP status hint for everything that is a server-side fault.
pub const INTERNAL_SERVER_ERROR: u16 = 500;

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate.
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// The contract text is not valid YAML/JSON or does not have the expected shape.
    #[from(ignore)]
    #[display("Parse Error: {_0}")]
    Parse(String),

    /// The contract parsed but cannot be compiled into schema bundles.
    #[display("Contract Error: {_0}")]
    Contract(ContractError),

    /// Inbound or outbound data failed validation.
    #[display("{_0}")]
    Validation(ValidationError),

    /// A handler emitted a status the contract has no schema for.
    #[display("{_0}")]
    MissingResponseSchema(MissingResponseSchema),

    /// Lookup of an operation identifier that was never compiled.
    #[from(ignore)]
    #[display("Unknown operation '{_0}'")]
    UnknownOperation(String),

    /// The validation engine refused a compiled schema.
    #[from(ignore)]
    #[display("Engine Error: schema '{schema}' could not be compiled: {source}")]
    Engine {
        /// Schema identifier (`operation:field`).
        schema: String,
        /// Underlying engine failure.
        source: EngineError,
    },

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

impl AppError {
    /// The HTTP status a host framework should answer with for this error.
    ///
    /// Only validation failures are the client's (or handler's) fault and map to
    /// `422 Unprocessable Entity`; anything else is a server misconfiguration.
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::Validation(_) => UNPROCESSABLE_ENTITY,
            _ => INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the validation failure carried by this error, if any.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            AppError::Validation(e) => Some(e),
            _ => None,
        }
    }
}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;

/// Reasons a contract is rejected at compile time. All of them abort the compile.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ContractError {
    /// An operation has no `operationId` and derivation is disabled.
    #[display("Operation {method} {path} has no operationId")]
    MissingOperationId {
        /// Upper-case HTTP method.
        method: String,
        /// Path template.
        path: String,
    },

    /// Two operations resolve to the same identifier.
    #[display("Duplicate operationId '{_0}'")]
    DuplicateOperationId(String),

    /// The `responses` map of an operation is empty.
    #[display("Operation '{operation}' declares no responses")]
    EmptyResponses {
        /// Offending operation.
        operation: String,
    },

    /// A response key is neither `NXX`, `default`, nor a status code.
    #[display("Operation '{operation}' has invalid response status key '{key}'")]
    InvalidStatusKey {
        /// Offending operation.
        operation: String,
        /// Raw key as written in the contract.
        key: String,
    },

    /// Two response keys normalize to the same status key.
    #[display("Operation '{operation}' declares response status '{key}' more than once")]
    DuplicateStatusKey {
        /// Offending operation.
        operation: String,
        /// Normalized key.
        key: String,
    },

    /// The same parameter name appears twice in one location at one level.
    #[display("Duplicate parameter '{name}' in location '{location}' at {site}")]
    DuplicateParameter {
        /// Where the parameter list lives (e.g. `GET /pets`).
        site: String,
        /// Parameter name.
        name: String,
        /// Parameter location.
        location: String,
    },

    /// A `$ref` that cannot be resolved within a single level of indirection.
    #[display("Unsupported $ref '{reference}' at {site}: {reason}")]
    UnsupportedRef {
        /// Where the reference was found.
        site: String,
        /// The raw `$ref` value.
        reference: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl std::error::Error for ContractError {}
