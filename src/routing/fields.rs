//! Request-field accessors.
//!
//! # Responsibilities
//! - Expose query-string and body fields by name (single-field access)
//! - Expose the whole field map (bulk access, also used for debug logging)
//!
//! # Design Decisions
//! - Form-encoded bodies are decoded; form fields win over query fields
//! - Any other non-empty body is the raw `parameter` payload unless the query set one

use std::collections::HashMap;
use axum::http::{header, HeaderMap};

/// Field carrying the RPC payload.
pub const PARAMETER: &str = "parameter";
pub const TIMESTAMP: &str = "timestamp";
pub const SECRET: &str = "secret";
pub const SECRET2: &str = "secret2";
pub const SERVICE_NAME: &str = "serviceName";
pub const VERSION: &str = "version";
pub const METHOD_NAME: &str = "methodName";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Access to the named fields of one request.
pub trait FieldAccessor: Send + Sync {
    /// Value of a single field, if present.
    fn field(&self, name: &str) -> Option<String>;

    /// Every recognised field.
    fn all_fields(&self) -> HashMap<String, String>;
}

/// Fields decoded from a buffered request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestFields {
    fields: HashMap<String, String>,
}

impl RequestFields {
    /// Decode fields from the request URI, headers and aggregated body.
    pub fn from_request(uri: &str, headers: &HeaderMap, body: &[u8]) -> Self {
        let mut fields: HashMap<String, String> = uri
            .split_once('?')
            .map(|(_, query)| decode_form(query.as_bytes()))
            .unwrap_or_default();

        if body.is_empty() {
            return Self { fields };
        }

        if is_form(headers) {
            fields.extend(decode_form(body));
        } else if !fields.contains_key(PARAMETER) {
            fields.insert(PARAMETER.to_string(), String::from_utf8_lossy(body).into_owned());
        }

        Self { fields }
    }

    pub fn from_map(fields: HashMap<String, String>) -> Self {
        Self { fields }
    }
}

impl FieldAccessor for RequestFields {
    fn field(&self, name: &str) -> Option<String> {
        self.fields.get(name).cloned()
    }

    fn all_fields(&self) -> HashMap<String, String> {
        self.fields.clone()
    }
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim_start().starts_with(FORM_CONTENT_TYPE))
        .unwrap_or(false)
}

fn decode_form(raw: &[u8]) -> HashMap<String, String> {
    url::form_urlencoded::parse(raw).into_owned().collect()
}
