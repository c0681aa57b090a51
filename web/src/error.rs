//! HTTP mapping of core errors.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use derive_more::{Display, From};
use oavk_core::AppError;
use serde_json::json;

/// A core error on its way out of an actix-web handler.
///
/// Validation failures answer `422` with `{"error": message, "errors": [...]}`;
/// everything else answers `500` with `{"error": message}`.
#[derive(Debug, Display, From)]
#[display("{_0}")]
pub struct ApiError(pub AppError);

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self.0.as_validation() {
            Some(validation) => json!({
                "error": validation.message(),
                "errors": validation.errors,
            }),
            None => json!({ "error": self.0.to_string() }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}
