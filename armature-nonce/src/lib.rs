//! # Armature Nonce
//!
//! Stateless, action-bound CSRF nonces for Armature applications.
//!
//! ## Features
//!
//! - ✅ **Stateless** - Nonces are recomputed, never stored
//! - ✅ **Signed** - Truncated HMAC-SHA256 over action, subject and time bucket
//! - ✅ **Graceful Expiry** - Accepted in the issuing bucket and the one after it
//! - ✅ **Action Binding** - A [`Nonce`] only ever verifies its own action
//! - ✅ **Embedding** - Escaped URLs and hidden form fields
//!
//! ## Quick Start
//!
//! ```rust
//! use armature_nonce::{Nonce, NonceConfig, Subject, TokenEngine, Verification};
//!
//! let config = NonceConfig::default();
//! let engine = TokenEngine::new(NonceConfig::generate_secret(), &config).unwrap();
//! let nonce = Nonce::new("delete-post-5", engine, config).unwrap();
//!
//! let subject = Subject::new("42");
//! let token = nonce.create(&subject).unwrap();
//!
//! assert!(nonce.verify(&token, &subject).unwrap().is_valid());
//! assert_eq!(
//!     nonce.verify(&token, &Subject::new("43")).unwrap(),
//!     Verification::Invalid
//! );
//! ```
//!
//! ## Expiry
//!
//! Time is cut into buckets of half the configured lifetime (12 hours by
//! default). A nonce is [`Verification::Fresh`] within the bucket it was issued
//! in, [`Verification::Stale`] in the next one, and invalid after that.
//!
//! ```rust
//! use armature_nonce::{NonceConfig, Subject, TokenEngine, TokenIssuer, Verification};
//! use chrono::DateTime;
//!
//! let config = NonceConfig::default().with_lifetime(3600);
//! let engine = TokenEngine::new(b"secret".to_vec(), &config).unwrap();
//! let subject = Subject::anonymous();
//!
//! let issued = DateTime::from_timestamp(0, 0).unwrap();
//! let token = engine.create_token("subscribe", &subject, issued).unwrap();
//!
//! let later = DateTime::from_timestamp(1800, 0).unwrap();
//! assert_eq!(
//!     engine.verify_token(&token, "subscribe", &subject, later).unwrap(),
//!     Verification::Stale
//! );
//! ```
//!
//! ## Forms and Links
//!
//! ```rust
//! use armature_nonce::{FieldOptions, Nonce, NonceConfig, Subject, TokenEngine};
//!
//! let config = NonceConfig::default();
//! let engine = TokenEngine::new(NonceConfig::generate_secret(), &config).unwrap();
//! let nonce = Nonce::new("update-profile", engine, config).unwrap();
//! let subject = Subject::new("42");
//!
//! let link = nonce.url("/profile?tab=1", &subject).unwrap();
//! assert!(link.starts_with("/profile?tab=1&amp;_token="));
//!
//! let mut out = Vec::new();
//! let html = nonce
//!     .render_field(&subject, &FieldOptions::new().with_referer("/profile"), &mut out)
//!     .unwrap();
//! assert!(html.contains(r#"name="_token""#));
//! assert!(html.contains(r#"name="_http_referer" value="/profile""#));
//! ```

pub mod ays;
pub mod config;
pub mod encoding;
pub mod engine;
pub mod error;
pub mod nonce;
pub mod secret;

pub use config::NonceConfig;
pub use engine::{Subject, TokenEngine, TokenIssuer, Verification};
pub use error::{NonceError, Result};
pub use nonce::{FieldOptions, Nonce};
pub use secret::{EnvSecret, Secret, SecretSource};
