//! Request normalization and decoding.
//!
//! # Responsibilities
//! - Normalize the request URI (drop the query, strip one trailing slash)
//! - Decode query parameters for routed handlers
//! - Read routed request bodies as JSON objects, tolerating bad input
//!
//! # Design Decisions
//! - A body that is missing, oversized, unreadable, not JSON or not a JSON
//!   object becomes `{}`; the client never sees a parse error
//! - Static asset requests never have their body read

use std::collections::BTreeMap;

use axum::body::Body;
use axum::http::{Method, Uri};
use serde_json::Value;

use crate::routing::strip_trailing_slash;
use crate::socket::frame::{parse_object, JsonObject};

/// Normalized request path: query removed, one trailing slash stripped.
pub fn normalize_path(path: &str) -> &str {
    let path = path.split_once('?').map_or(path, |(path, _)| path);
    strip_trailing_slash(path)
}

/// Query information handed to routed handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestQuery {
    /// HTTP method of the request.
    pub method: Method,
    /// Normalized path plus the raw query string, if any.
    pub uri: String,
    /// Normalized path.
    pub path: String,
    /// Decoded query parameters; repeated names keep every value in order.
    pub parameters: BTreeMap<String, Vec<String>>,
}

impl RequestQuery {
    pub fn from_parts(method: &Method, uri: &Uri) -> Self {
        let path = normalize_path(uri.path()).to_string();
        let query = uri.query().filter(|q| !q.is_empty());

        let mut parameters: BTreeMap<String, Vec<String>> = BTreeMap::new();
        if let Some(query) = query {
            for (name, value) in url::form_urlencoded::parse(query.as_bytes()) {
                parameters
                    .entry(name.into_owned())
                    .or_default()
                    .push(value.into_owned());
            }
        }

        let uri = match query {
            Some(query) => format!("{}?{}", path, query),
            None => path.clone(),
        };

        Self {
            method: method.clone(),
            uri,
            path,
            parameters,
        }
    }

    /// First value of the named parameter.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Parameters as a JSON object of string arrays.
    pub fn parameters_json(&self) -> Value {
        let object: JsonObject = self
            .parameters
            .iter()
            .map(|(name, values)| {
                let values = values.iter().cloned().map(Value::String).collect();
                (name.clone(), Value::Array(values))
            })
            .collect();
        Value::Object(object)
    }
}

/// Interpret raw body bytes as a JSON object, or `{}`.
pub fn parse_body(bytes: &[u8]) -> JsonObject {
    parse_object(bytes).unwrap_or_default()
}

/// Read a routed request body, up to `limit` bytes, as a JSON object.
pub async fn read_json_body(body: Body, limit: usize) -> JsonObject {
    match axum::body::to_bytes(body, limit).await {
        Ok(bytes) => parse_body(&bytes),
        Err(e) => {
            tracing::debug!(error = %e, "Request body unreadable, using empty object");
            JsonObject::new()
        }
    }
}
