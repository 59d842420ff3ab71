//! `Cookie` request header decoding.

use axum::http::{header, HeaderMap};

/// A single name/value pair sent by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Decode every `Cookie` header on the request.
///
/// Pairs with an empty or non-token name are skipped; surrounding double quotes on
/// values are removed.
pub fn request_cookies(headers: &HeaderMap) -> Vec<Cookie> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(parse_cookie_header)
        .collect()
}

fn parse_cookie_header(raw: &str) -> impl Iterator<Item = Cookie> + '_ {
    raw.split(';').filter_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        let name = name.trim();
        if name.is_empty() || !name.bytes().all(is_token_byte) {
            return None;
        }
        let value = value.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .unwrap_or(value);
        Some(Cookie::new(name, value))
    })
}

// RFC 7230 tchar
fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn decodes_multiple_pairs() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("session=abc; user=\"maple\""));

        let cookies = request_cookies(&headers);
        assert_eq!(
            cookies,
            vec![Cookie::new("session", "abc"), Cookie::new("user", "maple")]
        );
    }

    #[test]
    fn skips_invalid_names() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("=x; bad name=1; ok=2; novalue"));

        assert_eq!(request_cookies(&headers), vec![Cookie::new("ok", "2")]);
    }

    #[test]
    fn missing_header_yields_nothing() {
        assert!(request_cookies(&HeaderMap::new()).is_empty());
    }
}
