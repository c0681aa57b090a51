#![deny(missing_docs)]

//! # Resolver Module
//!
//! Turns the pieces of one OpenAPI operation into the schemas of a bundle.
//!
//! Handles:
//! - Parameter resolution (Inline and Reference) and the three per-location object schemas.
//! - Request body extraction, or the no-body marker.
//! - Response map normalization (exact, `NXX` category and `default` keys).

pub mod body;
pub mod params;
pub mod responses;

pub use body::resolve_request_body;
pub use params::{
    build_parameter_schemas, merge_parameters, resolve_parameters, ParamLocation, Parameter,
    ParameterSchemas,
};
pub use responses::{resolve_response_entries, resolve_responses, ResponseEntry};
