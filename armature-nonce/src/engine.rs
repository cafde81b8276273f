//! Token engine: derives and checks nonces.
//!
//! A nonce is a truncated HMAC-SHA256 over the time bucket, the action and the
//! subject. Nothing is stored; verification recomputes the digest for the
//! current bucket and the one before it.

use crate::config::NonceConfig;
use crate::error::{NonceError, Result};
use crate::secret::{Secret, SecretSource};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::sync::Arc;
use tracing::{debug, warn};

type HmacSha256 = Hmac<Sha256>;

/// Number of digest bytes kept in a nonce
const TOKEN_BYTES: usize = 12;

const DOMAIN: &[u8] = b"armature-nonce/v1";

/// Outcome of checking a nonce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verification {
    /// Issued in the current bucket
    Fresh,
    /// Issued in the previous bucket
    Stale,
    /// Matches neither bucket
    Invalid,
}

impl Verification {
    /// `Fresh` and `Stale` are both accepted
    pub fn is_valid(&self) -> bool {
        !matches!(self, Verification::Invalid)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verification::Fresh => "fresh",
            Verification::Stale => "stale",
            Verification::Invalid => "invalid",
        }
    }
}

/// The acting party a nonce is bound to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// User or visitor identifier; empty for anonymous visitors
    pub id: String,

    /// Login session the nonce should die with
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
}

impl Subject {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            session: None,
        }
    }

    /// Logged-out visitor
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Bind to a session token as well as the identifier
    pub fn with_session(mut self, session: impl Into<String>) -> Self {
        self.session = Some(session.into());
        self
    }
}

/// Capability set the context binding relies on
pub trait TokenIssuer: Send + Sync {
    /// Create the nonce for `action` and `subject` at `now`
    fn create_token(&self, action: &str, subject: &Subject, now: DateTime<Utc>) -> Result<String>;

    /// Check `token` against `action` and `subject` at `now`
    fn verify_token(
        &self,
        token: &str,
        action: &str,
        subject: &Subject,
        now: DateTime<Utc>,
    ) -> Result<Verification>;

    /// Lifetime in seconds the issuer buckets by, when it has a fixed one
    fn lifetime(&self) -> Option<u64> {
        None
    }
}

/// HMAC-SHA256 nonce engine
#[derive(Clone)]
pub struct TokenEngine {
    source: Arc<dyn SecretSource>,
    lifetime: u64,
    tick: i64,
}

impl TokenEngine {
    /// Create an engine with a fixed secret
    pub fn new(secret: impl Into<Vec<u8>>, config: &NonceConfig) -> Result<Self> {
        let secret = Secret::new(secret)?;
        Self::with_source(secret, config)
    }

    /// Create an engine that reads its secret from `source` on every call
    pub fn with_source(source: impl SecretSource + 'static, config: &NonceConfig) -> Result<Self> {
        config.validate()?;
        let tick = i64::try_from(config.tick().as_secs())
            .map_err(|_| NonceError::config("Nonce lifetime is too large"))?;

        debug!(tick_seconds = tick, "Creating nonce engine");

        Ok(Self {
            source: Arc::new(source),
            lifetime: config.lifetime,
            tick,
        })
    }

    /// Index of the time bucket containing `now`
    pub fn bucket(&self, now: DateTime<Utc>) -> i64 {
        now.timestamp().div_euclid(self.tick)
    }

    fn digest(&self, secret: &Secret, bucket: i64, action: &str, subject: &Subject) -> Result<String> {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| NonceError::config(e.to_string()))?;

        mac.update(DOMAIN);
        mac.update(&bucket.to_be_bytes());
        for field in [
            action,
            subject.id.as_str(),
            subject.session.as_deref().unwrap_or(""),
        ] {
            mac.update(&(field.len() as u64).to_be_bytes());
            mac.update(field.as_bytes());
        }

        let result = mac.finalize().into_bytes();
        Ok(URL_SAFE_NO_PAD.encode(&result[..TOKEN_BYTES]))
    }
}

impl TokenIssuer for TokenEngine {
    fn create_token(&self, action: &str, subject: &Subject, now: DateTime<Utc>) -> Result<String> {
        let secret = self.source.secret()?;
        self.digest(&secret, self.bucket(now), action, subject)
    }

    fn verify_token(
        &self,
        token: &str,
        action: &str,
        subject: &Subject,
        now: DateTime<Utc>,
    ) -> Result<Verification> {
        let secret = self.source.secret()?;

        if !token.is_empty() {
            let bucket = self.bucket(now);

            let expected = self.digest(&secret, bucket, action, subject)?;
            if constant_time_eq(token, &expected) {
                return Ok(Verification::Fresh);
            }

            let expected = self.digest(&secret, bucket - 1, action, subject)?;
            if constant_time_eq(token, &expected) {
                return Ok(Verification::Stale);
            }
        }

        warn!(action = %action, "Nonce verification failed");
        Ok(Verification::Invalid)
    }

    fn lifetime(&self) -> Option<u64> {
        Some(self.lifetime)
    }
}

/// Constant-time string comparison (prevent timing attacks)
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (byte_a, byte_b) in a.bytes().zip(b.bytes()) {
        result |= byte_a ^ byte_b;
    }

    result == 0
}
