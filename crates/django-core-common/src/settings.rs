//! Explicit configuration for django-core.
//!
//! Nothing in django-core reads from a process-wide settings registry. Every
//! component that needs configuration takes a [`CoreSettings`] (by reference,
//! or shared through an `Arc`). Settings are built from defaults, an optional
//! TOML document, and `DJANGO_CORE_*` environment variable overrides, in that
//! order.
//!
//! ```
//! use django_core_common::settings::CoreSettings;
//!
//! let settings = CoreSettings::from_toml_str(r#"
//!     site_root_uri = "https://example.com"
//!     email_backend = "locmem"
//! "#).unwrap();
//! assert_eq!(settings.site_root_uri, "https://example.com");
//! assert_eq!(settings.default_page_size, 15);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Which email transport the mail helpers should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailBackendKind {
    /// Deliver through SMTP.
    Smtp,
    /// Write each message to stdout.
    Console,
    /// Keep messages in memory (tests).
    Locmem,
    /// Accept and discard every message.
    Dummy,
}

impl EmailBackendKind {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "smtp" => Some(Self::Smtp),
            "console" => Some(Self::Console),
            "locmem" => Some(Self::Locmem),
            "dummy" => Some(Self::Dummy),
            _ => None,
        }
    }
}

/// All configuration consumed by the django-core crates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreSettings {
    // ── General ─────────────────────────────────────────────────────

    /// Enables pretty logging and other development conveniences.
    pub debug: bool,
    /// `EnvFilter` directive for the tracing subscriber.
    pub log_level: String,
    /// Absolute root of this site; `next` redirects must start with it or `/`.
    pub site_root_uri: String,
    /// URL probed by `has_internet_connection`.
    pub internet_connection_url: String,
    /// Default time zone for date helpers and the timezone middleware.
    pub time_zone: String,

    // ── Email ───────────────────────────────────────────────────────

    /// Transport used by the mail helpers. Defaults to the console.
    pub email_backend: EmailBackendKind,
    /// Default sender address.
    pub default_from_email: String,
    /// Template wrapping rendered markdown email bodies.
    pub base_html_email_template: String,
    /// SMTP host.
    pub email_host: String,
    /// SMTP port.
    pub email_port: u16,

    // ── Models and views ────────────────────────────────────────────

    /// Page size used by paging mixins when the request does not set `ps`.
    pub default_page_size: usize,
    /// Length of tokens produced by `get_next_token` when none is given.
    pub default_token_length: usize,
    /// Lifetime, in days, of a new token authorization.
    pub token_duration_days: i64,
}

impl Default for CoreSettings {
    fn default() -> Self {
        Self {
            debug: false,
            log_level: "info".to_string(),
            site_root_uri: String::new(),
            internet_connection_url: "http://google.com".to_string(),
            time_zone: "UTC".to_string(),
            email_backend: EmailBackendKind::Console,
            default_from_email: "webmaster@localhost".to_string(),
            base_html_email_template: "django_core/mail/base_email.html".to_string(),
            email_host: "localhost".to_string(),
            email_port: 25,
            default_page_size: 15,
            default_token_length: 15,
            token_duration_days: 1,
        }
    }
}

impl CoreSettings {
    /// Parses settings from a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(toml_str: &str) -> CoreResult<Self> {
        toml::from_str(toml_str)
            .map_err(|e| CoreError::ConfigurationError(format!("Failed to parse TOML: {e}")))
    }

    /// Reads and parses a TOML settings file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            CoreError::ConfigurationError(format!(
                "Failed to read TOML file '{}': {e}",
                path.as_ref().display()
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Reads a TOML file and then applies environment overrides.
    pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> CoreResult<Self> {
        let mut settings = Self::from_toml_file(path)?;
        settings.apply_env_overrides();
        Ok(settings)
    }

    /// Applies `DJANGO_CORE_<FIELD>` environment variables.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Applies overrides from an arbitrary key lookup.
    ///
    /// Keys are upper-cased field names prefixed with `DJANGO_CORE_`. Values
    /// that fail to parse are ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("DJANGO_CORE_DEBUG") {
            self.debug = matches!(val.to_lowercase().as_str(), "true" | "1" | "yes");
        }
        if let Some(val) = lookup("DJANGO_CORE_LOG_LEVEL") {
            self.log_level = val;
        }
        if let Some(val) = lookup("DJANGO_CORE_SITE_ROOT_URI") {
            self.site_root_uri = val;
        }
        if let Some(val) = lookup("DJANGO_CORE_INTERNET_CONNECTION_URL") {
            self.internet_connection_url = val;
        }
        if let Some(val) = lookup("DJANGO_CORE_TIME_ZONE") {
            self.time_zone = val;
        }
        if let Some(kind) =
            lookup("DJANGO_CORE_EMAIL_BACKEND").and_then(|v| EmailBackendKind::parse(&v))
        {
            self.email_backend = kind;
        }
        if let Some(val) = lookup("DJANGO_CORE_DEFAULT_FROM_EMAIL") {
            self.default_from_email = val;
        }
        if let Some(val) = lookup("DJANGO_CORE_BASE_HTML_EMAIL_TEMPLATE") {
            self.base_html_email_template = val;
        }
        if let Some(val) = lookup("DJANGO_CORE_EMAIL_HOST") {
            self.email_host = val;
        }
        if let Some(port) = lookup("DJANGO_CORE_EMAIL_PORT").and_then(|v| v.parse().ok()) {
            self.email_port = port;
        }
        if let Some(size) = lookup("DJANGO_CORE_DEFAULT_PAGE_SIZE").and_then(|v| v.parse().ok()) {
            self.default_page_size = size;
        }
        if let Some(len) = lookup("DJANGO_CORE_DEFAULT_TOKEN_LENGTH").and_then(|v| v.parse().ok())
        {
            self.default_token_length = len;
        }
        if let Some(days) = lookup("DJANGO_CORE_TOKEN_DURATION_DAYS").and_then(|v| v.parse().ok())
        {
            self.token_duration_days = days;
        }
    }

    /// Looks up a setting by its field name.
    ///
    /// Returns `ImproperlyConfigured` when no such setting exists.
    pub fn get_setting(&self, key: &str) -> CoreResult<serde_json::Value> {
        let value = serde_json::to_value(self)?;
        value.get(key).cloned().ok_or_else(|| {
            CoreError::ImproperlyConfigured(format!(
                "\"{key}\" setting has not been properly set."
            ))
        })
    }

    /// Like [`get_setting`](Self::get_setting) but falls back to `default`.
    pub fn get_setting_or(&self, key: &str, default: serde_json::Value) -> serde_json::Value {
        self.get_setting(key).unwrap_or(default)
    }
}
