//! The actix-web [`ResponseSink`].

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use oavk_core::{AppError, AppResult, ResponseSink};
use serde_json::Value;

/// Turns a validated status and body into an [`HttpResponse`].
///
/// A `null` body is sent without content (e.g. `204 No Content`).
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpSink;

impl ResponseSink for HttpSink {
    type Output = HttpResponse;

    fn send(self, status: u16, body: Value) -> AppResult<HttpResponse> {
        let status = StatusCode::from_u16(status)
            .map_err(|e| AppError::General(format!("Invalid status code {}: {}", status, e)))?;
        let mut builder = HttpResponse::build(status);
        Ok(if body.is_null() {
            builder.finish()
        } else {
            builder.json(body)
        })
    }
}
