#![deny(missing_docs)]

//! # OAVK Web Library
//!
//! actix-web adapter for the validation runtime, plus the petstore demo.

use actix_web::{get, HttpResponse, Responder};

/// HTTP mapping of core errors.
pub mod error;

/// Request extraction.
pub mod extract;

/// Handler execution inside a route wrapper.
pub mod handler;

/// Petstore demo service.
pub mod petstore;

/// Response sink.
pub mod sink;

pub use error::ApiError;
pub use extract::request_parts;
pub use handler::handle;
pub use sink::HttpSink;

/// A simple health check handler.
#[get("/health")]
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().body("OK")
}
