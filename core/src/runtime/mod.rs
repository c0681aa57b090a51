#![deny(missing_docs)]

//! # Validation Runtime
//!
//! - **engine**: the schema engine boundary and its `jsonschema` implementation.
//! - **session**: the lazily populated predicate cache.
//! - **status**: response status resolution.
//! - **validators**: per-operation validators.
//! - **intercept**: the request/response wrapper for host frameworks.

pub mod coerce;
pub mod dialect;
pub mod engine;
pub mod failure;
pub mod intercept;
pub mod session;
pub mod status;
pub mod validators;

pub use engine::{CoercionMode, EngineError, EngineOptions, JsonSchemaEngine, Predicate, SchemaEngine};
pub use failure::{Issue, MissingResponseSchema, Subject, ValidationError};
pub use intercept::{RequestParts, Responder, ResponseBuilder, ResponseSink, RouteWrapper};
pub use session::ValidatorSession;
pub use status::resolve_status;
pub use validators::OperationValidators;
