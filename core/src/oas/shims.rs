#![deny(missing_docs)]

//! # Contract Shims
//!
//! Generic structures acting as an Intermediate Deserialization Layer.
//! These structs map directly to the OpenAPI objects the compiler consumes.
//! Schemas stay untyped (`serde_json::Value`) so they are forwarded to the
//! validation engine exactly as written.

use indexmap::IndexMap;
use serde::de::Error as DeError;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use utoipa::openapi::RefOr;

/// The HTTP methods an OpenAPI path item may carry, in compile order.
pub const HTTP_METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Schema for the root document.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShimContract {
    /// OpenAPI version (e.g. "3.0.3").
    pub openapi: Option<String>,

    /// Metadata about the API. Kept opaque.
    pub info: Option<Value>,

    /// Path items.
    #[serde(default)]
    pub paths: ShimPaths,

    /// Components section used for reference resolution.
    #[serde(default)]
    pub components: Option<ShimComponents>,
}

/// Represents the Paths Object; `x-` extensions are set aside.
#[derive(Debug, Clone, Default)]
pub struct ShimPaths {
    /// Parsed path items keyed by path template, in document order.
    pub items: IndexMap<String, RefOr<ShimPathItem>>,
    /// Spec extensions attached to the Paths Object (x-...).
    pub extensions: IndexMap<String, Value>,
}

impl<'de> Deserialize<'de> for ShimPaths {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = IndexMap::<String, Value>::deserialize(deserializer)?;
        let mut items = IndexMap::new();
        let mut extensions = IndexMap::new();

        for (key, value) in raw {
            if key.starts_with("x-") {
                extensions.insert(key, value);
                continue;
            }
            // `null` path items are tolerated and skipped.
            if value.is_null() {
                continue;
            }
            let path_item = serde_json::from_value::<RefOr<ShimPathItem>>(value).map_err(|e| {
                DeError::custom(format!("Failed to parse path item '{}': {}", key, e))
            })?;
            items.insert(key, path_item);
        }

        Ok(Self { items, extensions })
    }
}

impl Serialize for ShimPaths {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.items.len() + self.extensions.len()))?;
        for (key, value) in &self.items {
            map.serialize_entry(key, value)?;
        }
        for (key, value) in &self.extensions {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// A Path Item: shared parameters plus up to eight operations.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ShimPathItem {
    /// Parameters inherited by every operation under this path.
    #[serde(default)]
    pub parameters: Vec<RefOr<ShimParameter>>,
    /// Path-level description.
    pub description: Option<String>,
    /// GET operation.
    pub get: Option<ShimOperation>,
    /// PUT operation.
    pub put: Option<ShimOperation>,
    /// POST operation.
    pub post: Option<ShimOperation>,
    /// DELETE operation.
    pub delete: Option<ShimOperation>,
    /// OPTIONS operation.
    pub options: Option<ShimOperation>,
    /// HEAD operation.
    pub head: Option<ShimOperation>,
    /// PATCH operation.
    pub patch: Option<ShimOperation>,
    /// TRACE operation.
    pub trace: Option<ShimOperation>,
}

impl ShimPathItem {
    /// Returns the operation for a lower-case method name.
    pub fn operation(&self, method: &str) -> Option<&ShimOperation> {
        match method {
            "get" => self.get.as_ref(),
            "put" => self.put.as_ref(),
            "post" => self.post.as_ref(),
            "delete" => self.delete.as_ref(),
            "options" => self.options.as_ref(),
            "head" => self.head.as_ref(),
            "patch" => self.patch.as_ref(),
            "trace" => self.trace.as_ref(),
            _ => None,
        }
    }

    /// Iterates `(method, operation)` pairs in [`HTTP_METHODS`] order.
    pub fn operations(&self) -> impl Iterator<Item = (&'static str, &ShimOperation)> {
        HTTP_METHODS
            .iter()
            .filter_map(move |m| self.operation(m).map(|op| (*m, op)))
    }
}

/// One HTTP operation.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ShimOperation {
    /// Unique operation identifier.
    #[serde(rename = "operationId")]
    pub operation_id: Option<String>,
    /// Short summary.
    pub summary: Option<String>,
    /// Long description, recorded in the bundle.
    pub description: Option<String>,
    /// Method-level parameters (added after path-level ones).
    #[serde(default)]
    pub parameters: Vec<RefOr<ShimParameter>>,
    /// Request body declaration.
    #[serde(rename = "requestBody")]
    pub request_body: Option<RefOr<ShimRequestBody>>,
    /// Responses keyed by raw status key (may include `x-` extensions).
    #[serde(default, deserialize_with = "deserialize_response_keys")]
    pub responses: IndexMap<String, Value>,
}

/// YAML allows unquoted `200:` keys, which arrive as integers.
#[derive(Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
enum RawKey {
    Text(String),
    Number(u64),
}

fn deserialize_response_keys<'de, D>(deserializer: D) -> Result<IndexMap<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = IndexMap::<RawKey, Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(key, value)| match key {
            RawKey::Text(s) => (s, value),
            RawKey::Number(n) => (n.to_string(), value),
        })
        .collect())
}

/// A local shim for Parameter that tolerates any `in` value.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ShimParameter {
    /// Name of the parameter.
    pub name: String,
    /// Location of the parameter (query, path, header, cookie, body...).
    #[serde(rename = "in")]
    pub parameter_in: String,
    /// A brief description of the parameter.
    pub description: Option<String>,
    /// Whether the parameter is required.
    #[serde(default)]
    pub required: bool,
    /// Schema definition.
    pub schema: Option<Value>,
    /// Content map (OAS 3.x complex parameter serialization).
    pub content: Option<IndexMap<String, ShimMediaType>>,
    /// Legacy Swagger 2.0 primitive type (e.g. string, integer).
    #[serde(rename = "type")]
    pub schema_type: Option<String>,
    /// Legacy Swagger 2.0 format modifier (e.g. int64, date-time).
    pub format: Option<String>,
    /// Legacy Swagger 2.0 array item schema.
    pub items: Option<Value>,
}

/// A Request Body Object.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ShimRequestBody {
    /// Description.
    pub description: Option<String>,
    /// Media types.
    #[serde(default)]
    pub content: IndexMap<String, ShimMediaType>,
    /// Whether a body must be present.
    #[serde(default)]
    pub required: bool,
}

/// A Response Object.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ShimResponse {
    /// Description.
    pub description: Option<String>,
    /// Media types.
    #[serde(default)]
    pub content: IndexMap<String, ShimMediaType>,
}

/// A Media Type Object; only its schema matters here.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ShimMediaType {
    /// Body schema.
    pub schema: Option<Value>,
}

/// Components object holding reusable definitions.
///
/// Entries stay raw so that a component which is itself a `$ref` can be detected
/// before it is deserialized.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ShimComponents {
    /// Reusable schemas; become the `definitions` namespace.
    #[serde(default)]
    pub schemas: IndexMap<String, Value>,
    /// Reusable parameters.
    #[serde(default)]
    pub parameters: IndexMap<String, Value>,
    /// Reusable request bodies.
    #[serde(rename = "requestBodies", default)]
    pub request_bodies: IndexMap<String, Value>,
    /// Reusable responses.
    #[serde(default)]
    pub responses: IndexMap<String, Value>,
    /// Everything else (headers, examples, securitySchemes, extensions...).
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// Picks the JSON media type out of a content map.
///
/// Preference order:
/// 1. `application/json`
/// 2. `application/json` with parameters (e.g. `; charset=utf-8`)
/// 3. Any `+json` media type (e.g. `application/vnd.api+json`)
///
/// Anything else is not JSON and yields `None`.
pub fn select_json_media(content: &IndexMap<String, ShimMediaType>) -> Option<&ShimMediaType> {
    if let Some(media) = content.get("application/json") {
        return Some(media);
    }

    let essence = |k: &str| k.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();

    if let Some((_, media)) = content
        .iter()
        .find(|(k, _)| essence(k) == "application/json")
    {
        return Some(media);
    }

    content
        .iter()
        .find(|(k, _)| essence(k).ends_with("+json"))
        .map(|(_, media)| media)
}
