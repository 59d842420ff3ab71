//! Request authentication.
//!
//! Runs after URL resolution and before the RPC call, only when `auth.enabled`.

use std::collections::HashMap;

use thiserror::Error;

use crate::routing::CallDescriptor;

/// Why a request was refused.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthRejection {
    #[error("apiKey is required")]
    MissingApiKey,

    #[error("unknown apiKey `{0}`")]
    UnknownApiKey(String),

    #[error("timestamp is required")]
    MissingTimestamp,

    #[error("secret does not match apiKey")]
    SecretMismatch,
}

/// Decides whether a resolved call may proceed.
pub trait Authenticator: Send + Sync {
    fn authenticate(&self, call: &CallDescriptor) -> Result<(), AuthRejection>;
}

/// Checks the apiKey against a table of known keys and their secrets.
#[derive(Debug, Clone, Default)]
pub struct KeySecretAuthenticator {
    keys: HashMap<String, String>,
}

impl KeySecretAuthenticator {
    pub fn new(keys: HashMap<String, String>) -> Self {
        Self { keys }
    }
}

impl Authenticator for KeySecretAuthenticator {
    fn authenticate(&self, call: &CallDescriptor) -> Result<(), AuthRejection> {
        let api_key = call
            .api_key()
            .filter(|k| !k.is_empty())
            .ok_or(AuthRejection::MissingApiKey)?;
        let expected = self
            .keys
            .get(api_key)
            .ok_or_else(|| AuthRejection::UnknownApiKey(api_key.to_string()))?;

        if call.timestamp().map_or(true, str::is_empty) {
            return Err(AuthRejection::MissingTimestamp);
        }
        if call.secret() != Some(expected.as_str()) {
            return Err(AuthRejection::SecretMismatch);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authenticator() -> KeySecretAuthenticator {
        KeySecretAuthenticator::new(HashMap::from([("key1".to_string(), "s3cret".to_string())]))
    }

    fn call(api_key: Option<&str>, timestamp: Option<&str>, secret: Option<&str>) -> CallDescriptor {
        let mut builder = CallDescriptor::builder()
            .timestamp(timestamp.map(String::from))
            .secret(secret.map(String::from));
        if let Some(key) = api_key {
            builder = builder.api_key(key);
        }
        builder.finish()
    }

    #[test]
    fn accepts_matching_secret() {
        assert_eq!(
            authenticator().authenticate(&call(Some("key1"), Some("1"), Some("s3cret"))),
            Ok(())
        );
    }

    #[test]
    fn rejects_each_failure() {
        let auth = authenticator();
        assert_eq!(
            auth.authenticate(&call(None, Some("1"), Some("s3cret"))),
            Err(AuthRejection::MissingApiKey)
        );
        assert_eq!(
            auth.authenticate(&call(Some("other"), Some("1"), Some("s3cret"))),
            Err(AuthRejection::UnknownApiKey("other".into()))
        );
        assert_eq!(
            auth.authenticate(&call(Some("key1"), None, Some("s3cret"))),
            Err(AuthRejection::MissingTimestamp)
        );
        assert_eq!(
            auth.authenticate(&call(Some("key1"), Some("1"), Some("wrong"))),
            Err(AuthRejection::SecretMismatch)
        );
    }
}
