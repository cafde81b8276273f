use crate::error::{NonceError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Default nonce lifetime: 24 hours, split into two 12 hour ticks
pub const DEFAULT_LIFETIME_SECS: u64 = 86_400;

/// Default query/form field carrying the nonce
pub const DEFAULT_FIELD_NAME: &str = "_token";

/// Default form field carrying the referring URL
pub const DEFAULT_REFERER_FIELD_NAME: &str = "_http_referer";

/// Nonce configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NonceConfig {
    /// Maximum nonce lifetime in seconds; a nonce lives between half of this and all of it
    pub lifetime: u64,

    /// Query/form field name for the nonce
    pub field_name: String,

    /// Form field name for the referer hidden input
    pub referer_field_name: String,
}

impl NonceConfig {
    /// Create a configuration with the default lifetime and field names
    pub fn new() -> Self {
        Self {
            lifetime: DEFAULT_LIFETIME_SECS,
            field_name: DEFAULT_FIELD_NAME.to_string(),
            referer_field_name: DEFAULT_REFERER_FIELD_NAME.to_string(),
        }
    }

    /// Load configuration from environment variables, falling back to defaults
    ///
    /// - `NONCE_LIFETIME` - lifetime in seconds
    /// - `NONCE_FIELD_NAME` - nonce field name
    /// - `NONCE_REFERER_FIELD` - referer field name
    pub fn from_env() -> Result<Self> {
        let mut config = Self::new();

        if let Ok(lifetime) = env::var("NONCE_LIFETIME") {
            config.lifetime = lifetime.trim().parse().map_err(|_| {
                NonceError::config(format!("NONCE_LIFETIME is not a number: {lifetime:?}"))
            })?;
        }
        if let Ok(name) = env::var("NONCE_FIELD_NAME") {
            config.field_name = name;
        }
        if let Ok(name) = env::var("NONCE_REFERER_FIELD") {
            config.referer_field_name = name;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from JSON; missing keys take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: NonceConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Generate a random 32 byte secret
    pub fn generate_secret() -> Vec<u8> {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        (0..32).map(|_| rng.r#gen()).collect()
    }

    /// Set lifetime in seconds
    pub fn with_lifetime(mut self, lifetime_seconds: u64) -> Self {
        self.lifetime = lifetime_seconds;
        self
    }

    /// Set nonce field name
    pub fn with_field_name(mut self, name: impl Into<String>) -> Self {
        self.field_name = name.into();
        self
    }

    /// Set referer field name
    pub fn with_referer_field_name(mut self, name: impl Into<String>) -> Self {
        self.referer_field_name = name.into();
        self
    }

    /// Width of one time bucket
    pub fn tick(&self) -> Duration {
        Duration::from_secs(self.lifetime / 2)
    }

    /// Check that the configuration can produce nonces
    pub fn validate(&self) -> Result<()> {
        if self.lifetime < 2 {
            return Err(NonceError::config(
                "Nonce lifetime must be at least 2 seconds",
            ));
        }
        if self.field_name.is_empty() {
            return Err(NonceError::config("Nonce field name must not be empty"));
        }
        if self.referer_field_name.is_empty() {
            return Err(NonceError::config("Referer field name must not be empty"));
        }
        Ok(())
    }
}

impl Default for NonceConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = NonceConfig::default();
        assert_eq!(config.lifetime, 86_400);
        assert_eq!(config.tick(), Duration::from_secs(43_200));
        assert_eq!(config.field_name, "_token");
        assert_eq!(config.referer_field_name, "_http_referer");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = NonceConfig::new()
            .with_lifetime(600)
            .with_field_name("_wpnonce")
            .with_referer_field_name("_wp_http_referer");

        assert_eq!(config.tick(), Duration::from_secs(300));
        assert_eq!(config.field_name, "_wpnonce");
        assert_eq!(config.referer_field_name, "_wp_http_referer");
    }

    #[test]
    fn test_invalid_lifetime() {
        let config = NonceConfig::new().with_lifetime(1);
        assert!(matches!(
            config.validate(),
            Err(NonceError::Configuration(_))
        ));
    }

    #[test]
    fn test_empty_field_name() {
        let config = NonceConfig::new().with_field_name("");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_json_partial() {
        let config = NonceConfig::from_json(r#"{"lifetime": 3600}"#).unwrap();
        assert_eq!(config.lifetime, 3600);
        assert_eq!(config.field_name, "_token");

        assert!(NonceConfig::from_json(r#"{"lifetime": 0}"#).is_err());
        assert!(matches!(
            NonceConfig::from_json("not json"),
            Err(NonceError::Serialization(_))
        ));
    }

    #[test]
    fn test_generate_secret() {
        let secret = NonceConfig::generate_secret();
        assert_eq!(secret.len(), 32);
        assert_ne!(secret, NonceConfig::generate_secret());
    }
}
