#![deny(missing_docs)]

//! # Validation Failures
//!
//! Per-call error values produced by the runtime. A [`ValidationError`] is the
//! recoverable kind (bad input or a handler emitting a bad body); a
//! [`MissingResponseSchema`] is a contract/handler mismatch and is fatal.

use crate::bundle::OperationId;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// One problem reported by a predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Dotted path to the offending value (`tags.0.name`); `None` for the root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Message in the `must ...` style, e.g. `must be integer`.
    pub message: String,
}

impl Issue {
    /// Creates an issue.
    pub fn new(path: Option<String>, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
        }
    }
}

/// Wording used when rendering issues of one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subject {
    /// Prefix used when an issue has a path, e.g. `Request path parameter`.
    pub specific: &'static str,
    /// Prefix used for root-level issues, e.g. `Request path`.
    pub entire: &'static str,
}

impl Subject {
    /// Creates a subject pair.
    pub const fn new(specific: &'static str, entire: &'static str) -> Self {
        Self { specific, entire }
    }

    /// Renders a single issue.
    pub fn render(&self, issue: &Issue) -> String {
        match &issue.path {
            Some(path) => format!("{} '{}' {}", self.specific, path, issue.message),
            None => format!("{} {}", self.entire, issue.message),
        }
    }
}

/// Data failed a predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Every issue reported, in engine order.
    pub errors: Vec<Issue>,
    /// Wording for the validated field.
    pub subject: Subject,
}

impl ValidationError {
    /// Creates a validation error.
    pub fn new(errors: Vec<Issue>, subject: Subject) -> Self {
        Self { errors, subject }
    }

    /// The aggregate message: one rendered line per issue.
    pub fn message(&self) -> String {
        self.errors
            .iter()
            .map(|issue| self.subject.render(issue))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for ValidationError {}

impl Serialize for ValidationError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("ValidationError", 4)?;
        state.serialize_field("message", &self.message())?;
        state.serialize_field("errors", &self.errors)?;
        state.serialize_field("subjectSpecific", self.subject.specific)?;
        state.serialize_field("subjectEntire", self.subject.entire)?;
        state.end()
    }
}

/// A handler emitted a status the operation has no response schema for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingResponseSchema {
    /// Operation being answered.
    pub operation: OperationId,
    /// Status code that matched neither an exact key, a category, nor `default`.
    pub status: u16,
}

impl fmt::Display for MissingResponseSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Operation '{}' declares no response schema for status {}",
            self.operation, self.status
        )
    }
}

impl std::error::Error for MissingResponseSchema {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const PATH: Subject = Subject::new("Request path parameter", "Request path");

    #[test]
    fn test_message_with_and_without_path() {
        let err = ValidationError::new(
            vec![
                Issue::new(Some("id".into()), "must be integer"),
                Issue::new(None, "must NOT have additional properties"),
            ],
            PATH,
        );
        assert_eq!(
            err.message(),
            "Request path parameter 'id' must be integer\nRequest path must NOT have additional properties"
        );
        assert_eq!(err.to_string(), err.message());
    }

    #[test]
    fn test_serialized_shape() {
        let err = ValidationError::new(vec![Issue::new(None, "must be object")], PATH);
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({
                "message": "Request path must be object",
                "errors": [{"message": "must be object"}],
                "subjectSpecific": "Request path parameter",
                "subjectEntire": "Request path"
            })
        );
    }

    #[test]
    fn test_missing_response_schema_display() {
        let err = MissingResponseSchema {
            operation: OperationId::new("findPet"),
            status: 503,
        };
        assert_eq!(
            err.to_string(),
            "Operation 'findPet' declares no response schema for status 503"
        );
    }
}
