//! Response envelopes.
//!
//! Every JSON body handed back to a client carries a `status` discriminator:
//! `1` for a successful RPC turnaround, `0` for anything the gateway refused or
//! could not complete.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::security::auth::AuthRejection;

/// Unknown server error, used for every RPC failure.
pub const RPC_FAILURE_CODE: &str = "Err-Core-098";
/// Request URI could not be resolved to a call.
pub const ILLEGAL_REQUEST_CODE: &str = "Err-Gateway-001";
/// Authentication refused the call.
pub const AUTH_REJECTED_CODE: &str = "Err-Gateway-002";

const STATUS_FIELD: &str = "\"status\"";
const STATUS_SUCCESS_OBJECT: &str = "{\"status\":1}";
const STATUS_SUCCESS_TAIL: &str = ",\"status\":1}";

const JSON_CONTENT_TYPE: &str = "application/json";
const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Error body. Field order is part of the wire format.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope<'a> {
    pub response_code: &'a str,
    pub response_msg: &'a str,
    pub success: &'a str,
    pub status: u8,
}

impl<'a> ErrorEnvelope<'a> {
    pub fn new(code: &'a str, message: &'a str) -> Self {
        Self {
            response_code: code,
            response_msg: message,
            success: code,
            status: 0,
        }
    }

    pub fn to_json(&self) -> String {
        // Only string and integer fields: serialization cannot fail.
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!("{{\"responseCode\":\"{code}\",\"responseMsg\":\"\",\"success\":\"{code}\",\"status\":0}}",
                code = self.response_code)
        })
    }
}

/// Add `"status":1` to an RPC result unless it already has a status field.
///
/// `{}` becomes `{"status":1}`; any other object gets `,"status":1` spliced in
/// before its last closing brace. Text without a closing brace is passed on as is.
pub fn inject_status(result: &str) -> String {
    if result.contains(STATUS_FIELD) {
        return result.to_string();
    }

    let Some(close) = result.rfind('}') else {
        return result.to_string();
    };

    let head = &result[..close];
    let is_empty_object = head.trim().strip_prefix('{').is_some_and(|rest| rest.trim().is_empty());
    if is_empty_object {
        return STATUS_SUCCESS_OBJECT.to_string();
    }

    let mut out = String::with_capacity(result.len() + STATUS_SUCCESS_TAIL.len());
    out.push_str(head);
    out.push_str(STATUS_SUCCESS_TAIL);
    out.push_str(&result[close + 1..]);
    out
}

pub fn rpc_failure(message: &str) -> String {
    ErrorEnvelope::new(RPC_FAILURE_CODE, message).to_json()
}

pub fn illegal_request(cause: &str) -> String {
    ErrorEnvelope::new(ILLEGAL_REQUEST_CODE, cause).to_json()
}

pub fn auth_rejected(rejection: &AuthRejection) -> String {
    ErrorEnvelope::new(AUTH_REJECTED_CODE, &rejection.to_string()).to_json()
}

/// HTTP 200 with a JSON body.
pub fn json(body: String) -> Response {
    with_content_type(StatusCode::OK, JSON_CONTENT_TYPE, body)
}

/// Canned plain-text answer.
pub fn text(status: StatusCode, body: &'static str) -> Response {
    with_content_type(status, TEXT_CONTENT_TYPE, body.to_string())
}

fn with_content_type(status: StatusCode, content_type: &'static str, body: String) -> Response {
    let mut response = (status, body).into_response();
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gets_status() {
        assert_eq!(inject_status("{}"), r#"{"status":1}"#);
        assert_eq!(inject_status(" { } "), r#"{"status":1}"#);
    }

    #[test]
    fn status_appended_before_closing_brace() {
        assert_eq!(inject_status(r#"{"a":1}"#), r#"{"a":1,"status":1}"#);
        assert_eq!(
            inject_status(r#"{"a":{"b":2}}"#),
            r#"{"a":{"b":2},"status":1}"#
        );
    }

    #[test]
    fn existing_status_forwarded_unchanged() {
        let body = r#"{"status":0,"reason":"busy"}"#;
        assert_eq!(inject_status(body), body);
    }

    #[test]
    fn non_object_forwarded_unchanged() {
        assert_eq!(inject_status("plain"), "plain");
        assert_eq!(inject_status(""), "");
    }

    #[test]
    fn error_envelope_field_order() {
        assert_eq!(
            rpc_failure("boom"),
            r#"{"responseCode":"Err-Core-098","responseMsg":"boom","success":"Err-Core-098","status":0}"#
        );
    }

    #[test]
    fn error_message_is_escaped() {
        let body = illegal_request(r#"bad "uri""#);
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed["responseMsg"], r#"bad "uri""#);
        assert_eq!(parsed["responseCode"], ILLEGAL_REQUEST_CODE);
        assert_eq!(parsed["status"], 0);
    }

    #[test]
    fn auth_envelope_carries_rejection() {
        let body = auth_rejected(&AuthRejection::MissingTimestamp);
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed["responseCode"], AUTH_REJECTED_CODE);
        assert_eq!(parsed["responseMsg"], "timestamp is required");
    }
}
