#![deny(missing_docs)]

//! # Schema Bundles
//!
//! The compiled shape of a contract: one [`SchemaBundle`] per operation, keyed by
//! [`OperationId`], plus the shared `definitions` namespace, together forming a
//! [`SchemaSet`]. Everything here is read-only once the compiler returns it.

use crate::runtime::failure::Subject;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

/// Description carried by the "no request body" marker schema.
pub const NO_REQUEST_BODY: &str = "No request body";

/// Stable identifier of one HTTP operation.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationId(String);

impl OperationId {
    /// Creates a new identifier.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Identifier used when the contract omits `operationId`, e.g. `GET /pets/{id}`.
    pub fn from_route(method: &str, path: &str) -> Self {
        Self(format!("{} {}", method.to_ascii_uppercase(), path))
    }

    /// Returns the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for OperationId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OperationId({:?})", self.0)
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A normalized key of a bundle's response map.
///
/// Ordering puts exact codes first, then categories, then `default`, which is also
/// the order in which status resolution tries them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StatusKey {
    /// An exact status code such as `200`.
    Exact(u16),
    /// A status class such as `4XX`, holding the leading digit.
    Category(u8),
    /// The `default` response.
    Default,
}

/// A response key that is neither a status code, a category, nor `default`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusKeyError(pub String);

impl fmt::Display for StatusKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid response status key '{}'", self.0)
    }
}

impl std::error::Error for StatusKeyError {}

impl StatusKey {
    /// The category key a live status code falls into, e.g. `404 -> 4XX`.
    ///
    /// Taken from the first decimal digit, so it never fails for a `u16`.
    pub fn category_of(status: u16) -> StatusKey {
        let mut lead = status;
        while lead >= 10 {
            lead /= 10;
        }
        StatusKey::Category(lead as u8)
    }
}

impl FromStr for StatusKey {
    type Err = StatusKeyError;

    /// Normalizes a raw contract key.
    ///
    /// - `4xx` / `4XX` -> `Category(4)`
    /// - `default` / `DEFAULT` -> `Default`
    /// - `200` / `0200` -> `Exact(200)`
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let key = raw.trim();
        let err = || StatusKeyError(raw.to_string());

        if key.len() >= 2 && key.to_ascii_uppercase().ends_with("XX") {
            let lead = &key[..key.len() - 2];
            return match lead.parse::<u8>() {
                Ok(d @ 1..=5) if lead.len() == 1 => Ok(StatusKey::Category(d)),
                _ => Err(err()),
            };
        }

        if key.eq_ignore_ascii_case("default") {
            return Ok(StatusKey::Default);
        }

        if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        match key.parse::<u16>() {
            Ok(code @ 100..=599) => Ok(StatusKey::Exact(code)),
            _ => Err(err()),
        }
    }
}

impl fmt::Display for StatusKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusKey::Exact(code) => write!(f, "{}", code),
            StatusKey::Category(lead) => write!(f, "{}XX", lead),
            StatusKey::Default => f.write_str("default"),
        }
    }
}

impl Serialize for StatusKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for StatusKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// The request body slot of a bundle.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBodySchema {
    /// A JSON body is declared with this schema.
    Json(Value),
    /// The operation accepts no body. Serialized as a schema matching nothing.
    NoBody,
}

impl RequestBodySchema {
    /// Returns the schema to hand to the validation engine.
    pub fn to_schema(&self) -> Value {
        match self {
            RequestBodySchema::Json(schema) => schema.clone(),
            RequestBodySchema::NoBody => json!({
                "description": NO_REQUEST_BODY,
                "not": {},
            }),
        }
    }

    /// True when the operation declares no request body.
    pub fn is_no_body(&self) -> bool {
        matches!(self, RequestBodySchema::NoBody)
    }

    fn is_marker(value: &Value) -> bool {
        let Some(obj) = value.as_object() else {
            return false;
        };
        obj.len() == 2
            && obj.get("description").and_then(Value::as_str) == Some(NO_REQUEST_BODY)
            && obj
                .get("not")
                .and_then(Value::as_object)
                .is_some_and(|not| not.is_empty())
    }
}

impl Serialize for RequestBodySchema {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_schema().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RequestBodySchema {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        if Self::is_marker(&value) {
            Ok(RequestBodySchema::NoBody)
        } else {
            Ok(RequestBodySchema::Json(value))
        }
    }
}

/// Normalized schemas for one operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaBundle {
    /// Path parameters object schema. Rejects unknown properties.
    pub params: Value,
    /// Query parameters object schema. Accepts unknown properties.
    pub query: Value,
    /// Header object schema (lower-case names). Accepts unknown properties.
    pub headers: Value,
    /// Request body schema or the no-body marker.
    pub request_body: RequestBodySchema,
    /// Response body schema per normalized status key, in declaration order.
    pub response_body: IndexMap<StatusKey, Value>,
    /// The operation's `description`, kept for diagnostics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SchemaBundle {
    /// Returns the schema stored for a field, if the field exists in this bundle.
    pub fn schema_for(&self, field: &Field) -> Option<Value> {
        match field {
            Field::Params => Some(self.params.clone()),
            Field::Query => Some(self.query.clone()),
            Field::Headers => Some(self.headers.clone()),
            Field::RequestBody => Some(self.request_body.to_schema()),
            Field::ResponseBody(status) => self.response_body.get(status).cloned(),
        }
    }
}

/// Full compiler output: every operation's bundle plus shared definitions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SchemaSet {
    /// Bundles keyed by operation identifier, in contract order.
    pub operations: IndexMap<OperationId, SchemaBundle>,
    /// `components.schemas`, addressable as `#/definitions/<name>`.
    #[serde(default)]
    pub definitions: IndexMap<String, Value>,
}

impl SchemaSet {
    /// Looks up a bundle by operation identifier.
    pub fn get(&self, operation: &str) -> Option<&SchemaBundle> {
        self.operations.get(operation)
    }

    /// Iterates operation identifiers in contract order.
    pub fn operation_ids(&self) -> impl Iterator<Item = &OperationId> {
        self.operations.keys()
    }
}

/// A validated part of a request or response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Path parameters.
    Params,
    /// Query string.
    Query,
    /// Headers.
    Headers,
    /// Request body.
    RequestBody,
    /// Response body for one status key.
    ResponseBody(StatusKey),
}

impl Field {
    /// Wording used when rendering errors for this field.
    pub fn subject(&self) -> Subject {
        match self {
            Field::Params => Subject::new("Request path parameter", "Request path"),
            Field::Query => Subject::new("Request query parameter", "Request query"),
            Field::Headers => Subject::new("Request header", "Request headers"),
            Field::RequestBody => Subject::new("Request body property", "Request body"),
            Field::ResponseBody(_) => Subject::new("Response body property", "Response body"),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Params => f.write_str("params"),
            Field::Query => f.write_str("query"),
            Field::Headers => f.write_str("headers"),
            Field::RequestBody => f.write_str("requestBody"),
            Field::ResponseBody(status) => write!(f, "responseBody:{}", status),
        }
    }
}

/// Memoization key of a compiled predicate: operation id + field (+ status key).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaId {
    /// Owning operation.
    pub operation: OperationId,
    /// Field within the operation.
    pub field: Field,
}

impl SchemaId {
    /// Creates a new schema identifier.
    pub fn new(operation: OperationId, field: Field) -> Self {
        Self { operation, field }
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.operation, self.field)
    }
}
