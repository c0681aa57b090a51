#![deny(missing_docs)]

//! # OAVK Core
//!
//! Compiles OpenAPI contracts into per-operation schema bundles and validates
//! live requests and responses against them.

/// Shared error types.
pub mod error;

/// Compiled schema bundles.
pub mod bundle;

/// Operation Schema Compiler.
pub mod compiler;

/// OpenAPI (OAS) parsing utilities.
pub mod oas;

/// Validation runtime.
pub mod runtime;

pub use bundle::{Field, OperationId, RequestBodySchema, SchemaBundle, SchemaId, SchemaSet, StatusKey};
pub use compiler::{compile_contract, compile_document, parse_contract, CompileOptions, OperationIdPolicy};
pub use error::{AppError, AppResult, ContractError};
pub use runtime::{
    CoercionMode, EngineOptions, Issue, JsonSchemaEngine, MissingResponseSchema, OperationValidators,
    RequestParts, Responder, ResponseBuilder, ResponseSink, RouteWrapper, ValidationError,
    ValidatorSession,
};
