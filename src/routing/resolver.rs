//! URL-to-RPC mapping for POST requests.
//!
//! # Responsibilities
//! - Classify a request URI against the ordered URL grammars
//! - Bind service / version / method / apiKey from the matched grammar
//! - Pull auth material and the RPC payload from the request fields
//! - Mark the descriptor illegal instead of failing
//!
//! # Grammars (first match wins)
//! ```text
//! full:  /{prefix}/{service}/{version}/{method}[/{apiKey}]
//! short: /{prefix}[/{apiKey}]          prefix must be "api"
//! ```
//!
//! # Design Decisions
//! - Patterns compiled once, shared by every resolver
//! - Without an apiKey segment the method segment is self-parsed for embedded
//!   arguments; with one, the method is taken verbatim

use std::collections::HashMap;

use axum::http::HeaderMap;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::arguments::resolve_arguments;
use super::cookies::request_cookies;
use super::descriptor::{CallDescriptor, CallDescriptorBuilder};
use super::fields::{
    FieldAccessor, METHOD_NAME, PARAMETER, SECRET, SECRET2, SERVICE_NAME, TIMESTAMP, VERSION,
};

/// Only prefix accepted by the short grammar.
pub const API_PREFIX: &str = "api";

pub const NO_MATCH_CAUSE: &str = "no match is available";
pub const PREFIX_CAUSE: &str = "prefix must start with api";

// A segment is any run of characters other than whitespace, `|`, `^` and `/`.
static FULL_GRAMMAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^/([^\s|^/]*)/([^\s|^/]*)/([^\s|^/]*)/([^\s|^/]*)(?:/([^\s|^/]*))?$")
        .expect("Failed to compile full URL grammar")
});

static SHORT_GRAMMAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^/([^\s|^/]*)(?:/([^\s|^/]*))?$").expect("Failed to compile short URL grammar")
});

type GrammarHandler =
    fn(&Captures<'_>, CallDescriptorBuilder, &dyn FieldAccessor) -> CallDescriptorBuilder;

/// A compiled URL pattern and the resolution applied when it matches.
struct Grammar {
    name: &'static str,
    pattern: &'static Regex,
    handler: GrammarHandler,
}

impl std::fmt::Debug for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grammar")
            .field("name", &self.name)
            .field("pattern", &self.pattern.as_str())
            .finish()
    }
}

/// Resolves POST request URIs into call descriptors.
#[derive(Debug)]
pub struct UrlMappingResolver {
    grammars: Vec<Grammar>,
}

impl UrlMappingResolver {
    /// Resolver with the full grammar tried before the short grammar.
    pub fn new() -> Self {
        Self {
            grammars: vec![
                Grammar {
                    name: "full",
                    pattern: &FULL_GRAMMAR,
                    handler: resolve_full_path,
                },
                Grammar {
                    name: "short",
                    pattern: &SHORT_GRAMMAR,
                    handler: resolve_short_path,
                },
            ],
        }
    }

    /// Resolve `uri` (path plus query) into a descriptor. Never fails: unusable
    /// requests come back illegal with a cause.
    pub fn resolve(
        &self,
        uri: &str,
        headers: &HeaderMap,
        fields: &dyn FieldAccessor,
    ) -> CallDescriptor {
        for grammar in &self.grammars {
            if let Some(captures) = grammar.pattern.captures(uri) {
                tracing::debug!(grammar = grammar.name, uri = %uri, "URL grammar matched");
                let builder = CallDescriptor::builder().cookies(request_cookies(headers));
                return (grammar.handler)(&captures, builder, fields).finish();
            }
        }

        tracing::debug!(uri = %uri, "No URL grammar matched");
        CallDescriptor::builder().reject(NO_MATCH_CAUSE).finish()
    }
}

impl Default for UrlMappingResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn group<'h>(captures: &Captures<'h>, index: usize) -> &'h str {
    captures.get(index).map(|m| m.as_str()).unwrap_or_default()
}

/// `/{prefix}/{service}/{version}/{method}[/{apiKey}]`
fn resolve_full_path(
    captures: &Captures<'_>,
    builder: CallDescriptorBuilder,
    fields: &dyn FieldAccessor,
) -> CallDescriptorBuilder {
    let builder = builder
        .url_prefix(group(captures, 1))
        .service(group(captures, 2))
        .version(group(captures, 3));
    let method = group(captures, 4);

    let Some(api_key) = captures.get(5) else {
        // Four segments cannot tell "method" from "method?args", so parse it.
        let (method, arguments) = resolve_arguments(method).into_parts();
        return builder
            .method(method)
            .arguments(arguments)
            .parameter(fields.field(PARAMETER));
    };

    let (api_key, arguments) = resolve_arguments(api_key.as_str()).into_parts();
    let timestamp = auth_field(TIMESTAMP, &arguments, fields);
    let secret = auth_field(SECRET, &arguments, fields);
    let secret2 = auth_field(SECRET2, &arguments, fields);

    builder
        .method(method)
        .api_key(api_key)
        .timestamp(timestamp)
        .secret(secret)
        .secret2(secret2)
        .parameter(fields.field(PARAMETER))
        .arguments(arguments)
}

/// `/{prefix}[/{apiKey}]`
fn resolve_short_path(
    captures: &Captures<'_>,
    builder: CallDescriptorBuilder,
    fields: &dyn FieldAccessor,
) -> CallDescriptorBuilder {
    let prefix = group(captures, 1);

    let Some(candidate) = captures.get(2) else {
        let (url_prefix, arguments) = resolve_arguments(prefix).into_parts();
        if url_prefix != API_PREFIX {
            return builder.reject(PREFIX_CAUSE);
        }
        return apply_bulk_fields(builder.url_prefix(url_prefix), arguments, fields);
    };

    if prefix != API_PREFIX {
        return builder.reject(PREFIX_CAUSE);
    }

    let (api_key, arguments) = resolve_arguments(candidate.as_str()).into_parts();
    apply_bulk_fields(builder.url_prefix(prefix).api_key(api_key), arguments, fields)
}

/// Embedded arguments first, then the request fields.
fn auth_field(
    name: &str,
    arguments: &HashMap<String, String>,
    fields: &dyn FieldAccessor,
) -> Option<String> {
    arguments.get(name).cloned().or_else(|| fields.field(name))
}

fn apply_bulk_fields(
    builder: CallDescriptorBuilder,
    arguments: HashMap<String, String>,
    fields: &dyn FieldAccessor,
) -> CallDescriptorBuilder {
    let mut all = fields.all_fields();
    tracing::debug!(fields = ?all, "Request fields");

    let timestamp = arguments.get(TIMESTAMP).cloned().or_else(|| all.remove(TIMESTAMP));
    let secret = arguments.get(SECRET).cloned().or_else(|| all.remove(SECRET));
    let secret2 = arguments.get(SECRET2).cloned().or_else(|| all.remove(SECRET2));

    builder
        .service_if_absent(all.remove(SERVICE_NAME))
        .version_if_absent(all.remove(VERSION))
        .method_if_absent(all.remove(METHOD_NAME))
        .parameter(all.remove(PARAMETER))
        .timestamp(timestamp)
        .secret(secret)
        .secret2(secret2)
        .arguments(arguments)
}
