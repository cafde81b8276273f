//! Secret material used to key nonce digests.
//!
//! The secret belongs to the host. The engine asks a [`SecretSource`] for it on
//! every call, so rotating the secret at the source takes effect immediately
//! and nonces issued under the previous secret stop verifying.

use crate::error::{NonceError, Result};
use std::env;
use std::fmt;

/// Opaque key material
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(Vec<u8>);

impl Secret {
    /// Wrap key material, rejecting an empty secret
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(NonceError::config("Nonce secret must not be empty"));
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret([REDACTED])")
    }
}

/// Supplies the current secret
pub trait SecretSource: Send + Sync {
    fn secret(&self) -> Result<Secret>;
}

impl SecretSource for Secret {
    fn secret(&self) -> Result<Secret> {
        Ok(self.clone())
    }
}

/// Reads the secret from an environment variable on every call
#[derive(Debug, Clone)]
pub struct EnvSecret {
    var: String,
}

impl EnvSecret {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvSecret {
    fn default() -> Self {
        Self::new("NONCE_SECRET")
    }
}

impl SecretSource for EnvSecret {
    fn secret(&self) -> Result<Secret> {
        let value = env::var(&self.var)
            .map_err(|e| NonceError::config(format!("{}: {}", self.var, e)))?;
        Secret::new(value)
    }
}
