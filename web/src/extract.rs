//! Builds [`RequestParts`] from an actix-web request.

use actix_web::HttpRequest;
use oavk_core::bundle::Field;
use oavk_core::{AppError, AppResult, Issue, RequestParts, ValidationError};
use serde_json::{Map, Value};
use url::form_urlencoded;

/// Extracts path parameters, query, headers and the JSON body.
///
/// - Path parameters come from the matched route pattern, as strings.
/// - A query key given more than once becomes an array.
/// - Header names are lower-case; repeated headers are joined with `", "`.
/// - An empty body is `None`; a body that is not JSON fails request validation.
pub fn request_parts(req: &HttpRequest, body: &[u8]) -> AppResult<RequestParts> {
    let params: Map<String, Value> = req
        .match_info()
        .iter()
        .map(|(name, value)| (name.to_string(), Value::String(value.to_string())))
        .collect();

    Ok(RequestParts {
        params: Value::Object(params),
        query: Value::Object(parse_query(req.query_string())),
        headers: Value::Object(collect_headers(req)),
        body: parse_body(body)?,
    })
}

fn parse_query(query: &str) -> Map<String, Value> {
    let mut map = Map::new();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        let value = Value::String(value.into_owned());
        match map.get_mut(&*key) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                map.insert(key.into_owned(), value);
            }
        }
    }
    map
}

fn collect_headers(req: &HttpRequest) -> Map<String, Value> {
    let mut map = Map::new();
    for (name, value) in req.headers().iter() {
        let Ok(value) = value.to_str() else {
            tracing::debug!(header = %name, "skipping non-ASCII header value");
            continue;
        };
        let name = name.as_str().to_ascii_lowercase();
        match map.get_mut(&name) {
            Some(Value::String(existing)) => {
                existing.push_str(", ");
                existing.push_str(value);
            }
            _ => {
                map.insert(name, Value::String(value.to_string()));
            }
        }
    }
    map
}

fn parse_body(body: &[u8]) -> AppResult<Option<Value>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body).map(Some).map_err(|e| {
        AppError::Validation(ValidationError::new(
            vec![Issue::new(None, format!("must be valid JSON ({})", e))],
            Field::RequestBody.subject(),
        ))
    })
}
