//! Session-scoped provider credential.
//!
//! The API key lives only in memory for the lifetime of the process. It is
//! never written to disk and its `Debug` output is redacted.

use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::sync::{Arc, RwLock};

/// Opaque secret authorizing calls to the generative provider.
#[derive(Clone)]
pub struct Credential(SecretString);

impl Credential {
    pub fn new(value: impl Into<String>) -> Self {
        let value: String = value.into();
        Self(SecretString::from(value))
    }

    /// Empty or whitespace-only keys count as absent.
    pub fn is_blank(&self) -> bool {
        self.0.expose_secret().trim().is_empty()
    }

    pub(crate) fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

impl From<&str> for Credential {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Credential {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Shared holder for the credential entered during this session.
#[derive(Clone, Default)]
pub struct CredentialStore {
    inner: Arc<RwLock<Option<Credential>>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored credential. Blank input is refused and leaves the
    /// current value untouched.
    pub fn set(&self, credential: impl Into<Credential>) -> crate::Result<()> {
        let credential = credential.into();
        if credential.is_blank() {
            return Err(crate::Error::MissingCredential);
        }
        *self.inner.write().unwrap_or_else(|e| e.into_inner()) = Some(credential);
        tracing::debug!("Session credential updated");
        Ok(())
    }

    pub fn clear(&self) {
        *self.inner.write().unwrap_or_else(|e| e.into_inner()) = None;
        tracing::debug!("Session credential cleared");
    }

    pub fn current(&self) -> Option<Credential> {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn is_set(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("is_set", &self.is_set())
            .finish()
    }
}
