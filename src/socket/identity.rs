//! Identity extraction from inbound payloads.

use serde_json::Value;

use crate::socket::frame::JsonObject;

/// Extracts the application identity from an inbound socket payload.
///
/// Returning `None` drops the message, exactly like a malformed payload.
pub trait IdentityExtractor: Send + Sync + 'static {
    fn extract(&self, payload: &JsonObject) -> Option<i64>;
}

impl<F> IdentityExtractor for F
where
    F: Fn(&JsonObject) -> Option<i64> + Send + Sync + 'static,
{
    fn extract(&self, payload: &JsonObject) -> Option<i64> {
        self(payload)
    }
}

/// Reads the identity from a named top-level field.
///
/// Accepts JSON integers and strings holding an integer.
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    field: String,
}

impl FieldExtractor {
    pub fn new(field: impl Into<String>) -> Self {
        Self { field: field.into() }
    }

    pub fn field(&self) -> &str {
        &self.field
    }
}

impl IdentityExtractor for FieldExtractor {
    fn extract(&self, payload: &JsonObject) -> Option<i64> {
        match payload.get(&self.field)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}
