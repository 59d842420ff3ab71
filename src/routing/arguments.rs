//! Embedded argument parsing for a single path segment.
//!
//! # Responsibilities
//! - Split `path?k1=v1&k2=v2` into the path part and an argument map
//! - Strip `.html` / `.htm` suffixes from the path part
//! - Never fail: malformed input degrades to an opaque path segment
//!
//! # Design Decisions
//! - Only the LAST `?` introduces arguments
//! - A `/` after that `?` means the `?` was not a query introducer at all
//! - Duplicate keys: last write wins
//! - Empty pieces (`a=1&&b=2`, a trailing `&`) are skipped; empty keys are kept

use std::collections::HashMap;
use thiserror::Error;

const QUERY_INTRODUCER: char = '?';
const PATH_SEPARATOR: char = '/';
const PAIR_SEPARATOR: char = '&';
const KEY_VALUE_SEPARATOR: char = '=';

/// Suffixes dropped from the path part, longest first.
const DISCARDED_SUFFIXES: [&str; 2] = [".html", ".htm"];

/// Result of parsing one path segment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentHolder {
    last_path: String,
    arguments: HashMap<String, String>,
}

impl ArgumentHolder {
    /// A holder with no embedded arguments.
    pub fn path_only(path: impl Into<String>) -> Self {
        Self {
            last_path: path.into(),
            arguments: HashMap::new(),
        }
    }

    /// Path portion before any embedded arguments.
    pub fn last_path(&self) -> &str {
        &self.last_path
    }

    pub fn arguments(&self) -> &HashMap<String, String> {
        &self.arguments
    }

    pub fn argument(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).map(String::as_str)
    }

    /// Split into `(last_path, arguments)`.
    pub fn into_parts(self) -> (String, HashMap<String, String>) {
        (self.last_path, self.arguments)
    }
}

/// Reasons a segment could not be split into arguments.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("argument pair `{0}` has no `=`")]
    MissingSeparator(String),
}

/// Parse a path segment that may carry embedded arguments.
///
/// Any parse error falls back to the whole, untouched segment as the path.
pub fn resolve_arguments(segment: &str) -> ArgumentHolder {
    match try_resolve_arguments(segment) {
        Ok(holder) => holder,
        Err(e) => {
            tracing::warn!(segment = %segment, error = %e, "Malformed embedded arguments, treating segment as path");
            ArgumentHolder::path_only(segment)
        }
    }
}

fn try_resolve_arguments(segment: &str) -> Result<ArgumentHolder, ArgumentError> {
    let Some(pos) = segment.rfind(QUERY_INTRODUCER) else {
        return Ok(ArgumentHolder::path_only(strip_suffix(segment)));
    };

    let tail = &segment[pos + QUERY_INTRODUCER.len_utf8()..];
    if tail.contains(PATH_SEPARATOR) {
        return Ok(ArgumentHolder::path_only(strip_suffix(segment)));
    }

    let mut arguments = HashMap::new();
    for pair in tail.split(PAIR_SEPARATOR).filter(|pair| !pair.is_empty()) {
        let (key, value) = pair
            .split_once(KEY_VALUE_SEPARATOR)
            .ok_or_else(|| ArgumentError::MissingSeparator(pair.to_string()))?;
        arguments.insert(key.to_string(), value.to_string());
    }

    Ok(ArgumentHolder {
        last_path: strip_suffix(&segment[..pos]).to_string(),
        arguments,
    })
}

/// Drop a trailing `.html` or `.htm` (case-sensitive).
pub fn strip_suffix(path: &str) -> &str {
    DISCARDED_SUFFIXES
        .iter()
        .find_map(|suffix| path.strip_suffix(suffix))
        .unwrap_or(path)
}
