#![deny(missing_docs)]

//! # OpenAPI Module
//!
//! - **shims**: serde layer over the contract document.
//! - **refs**: single-level `$ref` resolution and schema ref rewriting.
//! - **resolver**: parameter, request body and response resolution.

pub mod refs;
pub mod resolver;
pub mod shims;

pub use shims::{ShimComponents, ShimContract, ShimOperation, ShimPathItem, HTTP_METHODS};
