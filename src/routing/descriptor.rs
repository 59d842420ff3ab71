//! Call descriptor: the normalized result of resolving one request URI.
//!
//! A [`CallDescriptorBuilder`] is filled in by the resolver and frozen with
//! [`CallDescriptorBuilder::finish`]; the dispatcher only ever sees the finished,
//! immutable [`CallDescriptor`].

use std::collections::HashMap;

use super::cookies::Cookie;

/// Everything the gateway extracted from one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallDescriptor {
    url_prefix: Option<String>,
    service: Option<String>,
    version: Option<String>,
    method: Option<String>,
    api_key: Option<String>,
    timestamp: Option<String>,
    secret: Option<String>,
    secret2: Option<String>,
    arguments: HashMap<String, String>,
    parameter: Option<String>,
    cookies: Vec<Cookie>,
    legality: Legality,
}

/// Whether the request can be dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Legality {
    Legal,
    Illegal { cause: String },
}

/// The RPC coordinates of a legal descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RpcTarget<'a> {
    pub service: &'a str,
    pub version: &'a str,
    pub method: &'a str,
    pub parameter: &'a str,
}

impl CallDescriptor {
    pub fn builder() -> CallDescriptorBuilder {
        CallDescriptorBuilder::default()
    }

    pub fn url_prefix(&self) -> Option<&str> {
        self.url_prefix.as_deref()
    }

    pub fn service(&self) -> Option<&str> {
        self.service.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn timestamp(&self) -> Option<&str> {
        self.timestamp.as_deref()
    }

    pub fn secret(&self) -> Option<&str> {
        self.secret.as_deref()
    }

    pub fn secret2(&self) -> Option<&str> {
        self.secret2.as_deref()
    }

    pub fn arguments(&self) -> &HashMap<String, String> {
        &self.arguments
    }

    pub fn parameter(&self) -> Option<&str> {
        self.parameter.as_deref()
    }

    pub fn cookies(&self) -> &[Cookie] {
        &self.cookies
    }

    pub fn is_legal(&self) -> bool {
        matches!(self.legality, Legality::Legal)
    }

    /// Why the request was rejected, if it was.
    pub fn cause(&self) -> Option<&str> {
        match &self.legality {
            Legality::Legal => None,
            Legality::Illegal { cause } => Some(cause),
        }
    }

    /// RPC coordinates, present only for legal descriptors naming a service and method.
    ///
    /// A missing version or parameter is passed on as an empty string.
    pub fn rpc_target(&self) -> Option<RpcTarget<'_>> {
        if !self.is_legal() {
            return None;
        }
        Some(RpcTarget {
            service: self.service.as_deref().filter(|s| !s.is_empty())?,
            version: self.version.as_deref().unwrap_or_default(),
            method: self.method.as_deref().filter(|m| !m.is_empty())?,
            parameter: self.parameter.as_deref().unwrap_or_default(),
        })
    }
}

/// Incrementally assembled descriptor.
#[derive(Debug, Clone, Default)]
pub struct CallDescriptorBuilder {
    url_prefix: Option<String>,
    service: Option<String>,
    version: Option<String>,
    method: Option<String>,
    api_key: Option<String>,
    timestamp: Option<String>,
    secret: Option<String>,
    secret2: Option<String>,
    arguments: HashMap<String, String>,
    parameter: Option<String>,
    cookies: Vec<Cookie>,
    cause: Option<String>,
}

impl CallDescriptorBuilder {
    pub fn url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.url_prefix = Some(prefix.into());
        self
    }

    pub fn service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn timestamp(mut self, timestamp: Option<String>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn secret(mut self, secret: Option<String>) -> Self {
        self.secret = secret;
        self
    }

    pub fn secret2(mut self, secret2: Option<String>) -> Self {
        self.secret2 = secret2;
        self
    }

    pub fn arguments(mut self, arguments: HashMap<String, String>) -> Self {
        self.arguments = arguments;
        self
    }

    pub fn parameter(mut self, parameter: Option<String>) -> Self {
        self.parameter = parameter;
        self
    }

    pub fn cookies(mut self, cookies: Vec<Cookie>) -> Self {
        self.cookies = cookies;
        self
    }

    /// Fill the service/version/method triple only where it is still unset.
    pub(crate) fn service_if_absent(mut self, service: Option<String>) -> Self {
        self.service = self.service.or(service);
        self
    }

    pub(crate) fn version_if_absent(mut self, version: Option<String>) -> Self {
        self.version = self.version.or(version);
        self
    }

    pub(crate) fn method_if_absent(mut self, method: Option<String>) -> Self {
        self.method = self.method.or(method);
        self
    }

    /// Mark the request illegal; the first cause recorded is kept.
    pub fn reject(mut self, cause: impl Into<String>) -> Self {
        if self.cause.is_none() {
            self.cause = Some(cause.into());
        }
        self
    }

    pub fn finish(self) -> CallDescriptor {
        let legality = match self.cause {
            None => Legality::Legal,
            Some(cause) => Legality::Illegal { cause },
        };
        CallDescriptor {
            url_prefix: self.url_prefix,
            service: self.service,
            version: self.version,
            method: self.method,
            api_key: self.api_key,
            timestamp: self.timestamp,
            secret: self.secret,
            secret2: self.secret2,
            arguments: self.arguments,
            parameter: self.parameter,
            cookies: self.cookies,
            legality,
        }
    }
}
