use crate::ays;
use crate::config::NonceConfig;
use crate::encoding::{body_field, escape_html_attribute, query_param, set_query_param};
use crate::engine::{Subject, TokenIssuer, Verification};
use crate::error::{NonceError, Result};
use chrono::{DateTime, Utc};
use std::io::Write;
use std::sync::Arc;
use tracing::debug;

/// Options for [`Nonce::render_field`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldOptions {
    /// Field name; the configured field name when `None`
    pub name: Option<String>,

    /// Referring URL to carry in a second hidden field
    pub referer: Option<String>,

    /// Write the markup to the output instead of returning it
    pub emit: bool,
}

impl FieldOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set field name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add the referer hidden field
    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self
    }

    /// Write to the output stream instead of returning markup
    pub fn with_emit(mut self, emit: bool) -> Self {
        self.emit = emit;
        self
    }
}

/// Nonce operations bound to a single action
#[derive(Clone)]
pub struct Nonce {
    action: String,
    issuer: Arc<dyn TokenIssuer>,
    config: Arc<NonceConfig>,
}

impl Nonce {
    /// Bind `action` to an issuer
    ///
    /// `config` must carry the same lifetime the issuer buckets by.
    pub fn new(
        action: impl Into<String>,
        issuer: impl TokenIssuer + 'static,
        config: NonceConfig,
    ) -> Result<Self> {
        Self::with_shared(action, Arc::new(issuer), Arc::new(config))
    }

    /// Bind `action` to an issuer and configuration shared with other bindings
    pub fn with_shared(
        action: impl Into<String>,
        issuer: Arc<dyn TokenIssuer>,
        config: Arc<NonceConfig>,
    ) -> Result<Self> {
        let action = action.into();
        if action.is_empty() {
            return Err(NonceError::config("Nonce action must not be empty"));
        }
        config.validate()?;
        if let Some(lifetime) = issuer.lifetime() {
            if lifetime != config.lifetime {
                return Err(NonceError::config(format!(
                    "Nonce lifetime {} does not match the issuer lifetime {}",
                    config.lifetime, lifetime
                )));
            }
        }

        debug!(action = %action, "Binding nonce action");

        Ok(Self {
            action,
            issuer,
            config,
        })
    }

    /// Bind another action to the same issuer and configuration
    pub fn rebind(&self, action: impl Into<String>) -> Result<Self> {
        Self::with_shared(action, self.issuer.clone(), self.config.clone())
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn config(&self) -> &NonceConfig {
        &self.config
    }

    /// Create a nonce for `subject` now
    pub fn create(&self, subject: &Subject) -> Result<String> {
        self.create_at(subject, Utc::now())
    }

    pub fn create_at(&self, subject: &Subject, now: DateTime<Utc>) -> Result<String> {
        self.issuer.create_token(&self.action, subject, now)
    }

    /// Verify a nonce for `subject` now
    pub fn verify(&self, token: &str, subject: &Subject) -> Result<Verification> {
        self.verify_at(token, subject, Utc::now())
    }

    pub fn verify_at(
        &self,
        token: &str,
        subject: &Subject,
        now: DateTime<Utc>,
    ) -> Result<Verification> {
        self.issuer.verify_token(token, &self.action, subject, now)
    }

    /// Verify the nonce carried in the query string of `url`
    ///
    /// A missing parameter is `Invalid`.
    pub fn verify_query(
        &self,
        url: &str,
        subject: &Subject,
        field_name: &str,
    ) -> Result<Verification> {
        let token = query_param(url, field_name).unwrap_or_default();
        self.verify(&token, subject)
    }

    /// Verify the nonce carried in a JSON or urlencoded form body
    pub fn verify_body(
        &self,
        body: &[u8],
        subject: &Subject,
        field_name: &str,
    ) -> Result<Verification> {
        let token = body_field(body, field_name).unwrap_or_default();
        self.verify(&token, subject)
    }

    /// Add a nonce to `url` under the configured field name
    pub fn url(&self, url: &str, subject: &Subject) -> Result<String> {
        self.augment_url(url, subject, &self.config.field_name)
    }

    /// Add a nonce to `url` as `field_name`, escaped for an HTML attribute
    ///
    /// An existing `field_name` parameter is replaced. Accepts URLs already
    /// escaped by this method.
    pub fn augment_url(&self, url: &str, subject: &Subject, field_name: &str) -> Result<String> {
        let token = self.create(subject)?;
        let url = set_query_param(&url.replace("&amp;", "&"), field_name, &token)?;
        Ok(escape_html_attribute(&url))
    }

    /// Hidden form field markup for the nonce, plus the referer field if requested
    pub fn field_markup(&self, subject: &Subject, options: &FieldOptions) -> Result<String> {
        let token = self.create(subject)?;
        let name = options.name.as_deref().unwrap_or(&self.config.field_name);

        let mut html = hidden_input(name, &token);
        if let Some(referer) = &options.referer {
            html.push_str(&hidden_input(&self.config.referer_field_name, referer));
        }
        Ok(html)
    }

    /// Render the hidden fields, either writing them to `out` or returning them
    ///
    /// With `options.emit` the markup goes to `out` and an empty string is returned.
    pub fn render_field<W: Write>(
        &self,
        subject: &Subject,
        options: &FieldOptions,
        out: &mut W,
    ) -> Result<String> {
        let html = self.field_markup(subject, options)?;
        if options.emit {
            out.write_all(html.as_bytes())?;
            return Ok(String::new());
        }
        Ok(html)
    }

    /// Confirmation message to show when this action's nonce failed to verify
    pub fn ays(&self, explanation: Option<&str>, link: Option<&str>) -> String {
        ays::confirmation(&self.action, explanation, link)
    }
}

impl std::fmt::Debug for Nonce {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Nonce")
            .field("action", &self.action)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn hidden_input(name: &str, value: &str) -> String {
    format!(
        r#"<input type="hidden" name="{}" value="{}" />"#,
        escape_html_attribute(name),
        escape_html_attribute(value)
    )
}
