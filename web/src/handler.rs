//! Running a route handler inside a [`RouteWrapper`].

use crate::error::ApiError;
use crate::extract::request_parts;
use actix_web::{HttpRequest, HttpResponse};
use oavk_core::{AppResult, RequestParts, Responder, RouteWrapper};
use std::future::Future;

/// Validates the request, then awaits `handler` with the coerced parts.
///
/// The handler answers through the [`Responder`], normally ending with
/// `responder.status(code)?.send(body, HttpSink)`. Any error, from either side,
/// is turned into the matching HTTP error response.
pub async fn handle<F, Fut>(
    wrapper: &RouteWrapper,
    req: &HttpRequest,
    body: &[u8],
    handler: F,
) -> Result<HttpResponse, ApiError>
where
    F: FnOnce(RequestParts, Responder) -> Fut,
    Fut: Future<Output = AppResult<HttpResponse>>,
{
    let mut parts = request_parts(req, body)?;
    wrapper.validate_request(&mut parts)?;
    Ok(handler(parts, wrapper.responder()).await?)
}
