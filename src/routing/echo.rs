//! Echo URL matching for GET introspection requests: `/api/echo/{service}/{version}`.

use once_cell::sync::Lazy;
use regex::Regex;

pub const ECHO_PREFIX: &str = "/api/echo";

static ECHO_GRAMMAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^/([^\s|^/]*)/([^\s|^/]*)/([^\s|^/]*)/([^\s|^/]*)$")
        .expect("Failed to compile echo URL grammar")
});

/// Service addressed by an echo request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EchoTarget {
    pub service: String,
    pub version: String,
}

/// Match an echo URL. Anything else, including a different four-segment prefix,
/// is simply no match.
pub fn match_echo_url(url: &str) -> Option<EchoTarget> {
    let captures = ECHO_GRAMMAR.captures(url)?;
    let prefix = format!("/{}/{}", &captures[1], &captures[2]);
    if prefix != ECHO_PREFIX {
        return None;
    }
    Some(EchoTarget {
        service: captures[3].to_string(),
        version: captures[4].to_string(),
    })
}
