#![deny(missing_docs)]

//! # Interception Wrapper
//!
//! Sits between a host framework and a route handler:
//!
//! 1. The request's `params`, `headers`, `query` and body are validated (in that
//!    order) before the handler runs. The first failure short-circuits.
//! 2. The handler answers through a [`Responder`]: `status(code)` resolves the
//!    governing response schema, and [`ResponseBuilder::send`] validates the body
//!    before handing it to the host's [`ResponseSink`].

use crate::bundle::{OperationId, StatusKey};
use crate::error::{AppError, AppResult};
use crate::runtime::session::ValidatorSession;
use crate::runtime::validators::OperationValidators;
use serde_json::{Map, Value};
use std::sync::Arc;

/// The validated parts of an inbound request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestParts {
    /// Path parameters by name.
    pub params: Value,
    /// Query parameters by name.
    pub query: Value,
    /// Headers by lower-case name.
    pub headers: Value,
    /// Parsed JSON body, `None` when the request carried none.
    pub body: Option<Value>,
}

impl Default for RequestParts {
    fn default() -> Self {
        Self {
            params: Value::Object(Map::new()),
            query: Value::Object(Map::new()),
            headers: Value::Object(Map::new()),
            body: None,
        }
    }
}

/// The host's transport send.
pub trait ResponseSink {
    /// Whatever the host produces from a sent response.
    type Output;

    /// Sends a validated body with `status`.
    fn send(self, status: u16, body: Value) -> AppResult<Self::Output>;
}

/// Wraps one operation's handler with request and response validation.
#[derive(Debug, Clone)]
pub struct RouteWrapper {
    validators: OperationValidators,
}

impl RouteWrapper {
    /// Creates a wrapper for `operation`. Fails when the session does not know it.
    pub fn new(session: &Arc<ValidatorSession>, operation: &str) -> AppResult<Self> {
        Ok(Self {
            validators: session.operation(operation)?,
        })
    }

    /// The wrapped operation.
    pub fn operation(&self) -> &OperationId {
        self.validators.operation()
    }

    /// Validates (and coerces) the request in place.
    pub fn validate_request(&self, parts: &mut RequestParts) -> AppResult<()> {
        let v = &self.validators;
        v.params(&mut parts.params)
            .and_then(|_| v.headers(&mut parts.headers))
            .and_then(|_| v.query(&mut parts.query))
            .and_then(|_| v.request_body(parts.body.as_mut()))
            .inspect_err(|e| {
                tracing::warn!(operation = %self.operation(), error = %e, "rejected request");
            })
    }

    /// A responder for this operation.
    pub fn responder(&self) -> Responder {
        Responder {
            validators: self.validators.clone(),
        }
    }

    /// Validates the request, then runs `handler` with the coerced request.
    ///
    /// The handler is not called when request validation fails.
    pub fn call<T, F>(&self, mut parts: RequestParts, handler: F) -> AppResult<T>
    where
        F: FnOnce(RequestParts, Responder) -> AppResult<T>,
    {
        self.validate_request(&mut parts)?;
        handler(parts, self.responder())
    }
}

/// Handed to route handlers to emit validated responses.
#[derive(Debug, Clone)]
pub struct Responder {
    validators: OperationValidators,
}

impl Responder {
    /// Selects the response status, resolving its schema immediately.
    pub fn status(&self, code: u16) -> AppResult<ResponseBuilder> {
        let key = self.validators.resolve_status(code)?;
        Ok(ResponseBuilder {
            validators: self.validators.clone(),
            status: code,
            key,
        })
    }

    /// Sends `body` with status 200.
    pub fn send<S: ResponseSink>(&self, body: Value, sink: S) -> AppResult<S::Output> {
        self.status(200)?.send(body, sink)
    }
}

/// A response with its status fixed; only the body remains to be sent.
#[derive(Debug, Clone)]
pub struct ResponseBuilder {
    validators: OperationValidators,
    status: u16,
    key: StatusKey,
}

impl ResponseBuilder {
    /// The status code that will be sent.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// The response key whose schema governs this response.
    pub fn schema_key(&self) -> StatusKey {
        self.key
    }

    /// Validates `body` and hands it to `sink`. An invalid body is not sent.
    pub fn send<S: ResponseSink>(self, mut body: Value, sink: S) -> AppResult<S::Output> {
        if let Err(e) = self.validators.response_body_for(self.key, &mut body) {
            if let AppError::Validation(_) = &e {
                tracing::warn!(
                    operation = %self.validators.operation(),
                    status = self.status,
                    error = %e,
                    "rejected response"
                );
            }
            return Err(e);
        }
        sink.send(self.status, body)
    }
}
