#![deny(missing_docs)]

//! # Operation Validators
//!
//! The per-operation validator surface: `params`, `query`, `headers`,
//! `request_body` and the status-aware `response_body`.

use crate::bundle::{Field, OperationId, RequestBodySchema, SchemaId, StatusKey};
use crate::error::{AppError, AppResult};
use crate::runtime::failure::MissingResponseSchema;
use crate::runtime::session::ValidatorSession;
use crate::runtime::status::resolve_status;
use serde_json::Value;
use std::sync::Arc;

/// Validators bound to one operation of a session. Cheap to clone.
#[derive(Debug, Clone)]
pub struct OperationValidators {
    session: Arc<ValidatorSession>,
    operation: OperationId,
}

impl OperationValidators {
    pub(crate) fn new(session: Arc<ValidatorSession>, operation: OperationId) -> Self {
        Self { session, operation }
    }

    /// The operation these validators belong to.
    pub fn operation(&self) -> &OperationId {
        &self.operation
    }

    fn validate(&self, field: Field, data: &mut Value) -> AppResult<()> {
        self.session
            .validate(&SchemaId::new(self.operation.clone(), field), data)
    }

    /// Validates path parameters.
    pub fn params(&self, data: &mut Value) -> AppResult<()> {
        self.validate(Field::Params, data)
    }

    /// Validates the query object.
    pub fn query(&self, data: &mut Value) -> AppResult<()> {
        self.validate(Field::Query, data)
    }

    /// Validates the header object (lower-case names).
    pub fn headers(&self, data: &mut Value) -> AppResult<()> {
        self.validate(Field::Headers, data)
    }

    /// Validates the request body.
    ///
    /// An absent body (`None` or `null`) passes when the operation declares no
    /// body. When a body schema exists, an absent body is validated as `null`.
    pub fn request_body(&self, body: Option<&mut Value>) -> AppResult<()> {
        let no_body = self
            .session
            .bundle(self.operation.as_str())?
            .request_body
            .is_no_body();

        match body {
            None | Some(Value::Null) if no_body => Ok(()),
            None => self.validate(Field::RequestBody, &mut Value::Null),
            Some(data) => self.validate(Field::RequestBody, data),
        }
    }

    /// Resolves which response key governs `status`.
    ///
    /// No match is a [`MissingResponseSchema`] error, logged at `error` level.
    pub fn resolve_status(&self, status: u16) -> AppResult<StatusKey> {
        let bundle = self.session.bundle(self.operation.as_str())?;
        resolve_status(&bundle.response_body, status).ok_or_else(|| {
            let missing = MissingResponseSchema {
                operation: self.operation.clone(),
                status,
            };
            tracing::error!(
                operation = %self.operation,
                status,
                declared = ?bundle.response_body.keys().map(ToString::to_string).collect::<Vec<_>>(),
                "{}",
                missing
            );
            AppError::MissingResponseSchema(missing)
        })
    }

    /// Validates a response body against an already resolved key.
    pub fn response_body_for(&self, key: StatusKey, data: &mut Value) -> AppResult<()> {
        self.validate(Field::ResponseBody(key), data)
    }

    /// Resolves `status` and validates the response body against its schema.
    pub fn response_body(&self, data: &mut Value, status: u16) -> AppResult<()> {
        let key = self.resolve_status(status)?;
        self.response_body_for(key, data)
    }

    /// The declared request body slot of this operation.
    pub fn request_body_schema(&self) -> AppResult<&RequestBodySchema> {
        Ok(&self.session.bundle(self.operation.as_str())?.request_body)
    }
}
