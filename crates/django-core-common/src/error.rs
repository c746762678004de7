//! Error types shared by every django-core crate.
//!
//! [`CoreError`] covers HTTP-style failures (not found, permission denied),
//! ORM lookups, validation, configuration, and the few I/O paths the crates
//! touch. [`ValidationError`] carries a message, a machine-readable code and
//! optional interpolation parameters, the same shape form and model fields use.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

/// A validation failure with an optional set of per-field errors.
///
/// # Examples
///
/// ```
/// use django_core_common::error::ValidationError;
///
/// let err = ValidationError::new("'x' value must be a list type.", "invalid_list")
///     .with_param("value", "x");
/// assert_eq!(err.code, "invalid_list");
/// assert_eq!(err.params["value"], "x");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The human readable message.
    pub message: String,
    /// A short code such as `invalid_choice` or `required`.
    pub code: String,
    /// Values interpolated into the message.
    pub params: HashMap<String, String>,
    /// Per-field errors, keyed by field name.
    pub field_errors: HashMap<String, Vec<Self>>,
}

impl ValidationError {
    /// Creates a new `ValidationError` with a message and code.
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            params: HashMap::new(),
            field_errors: HashMap::new(),
        }
    }

    /// Creates a `ValidationError` holding only per-field errors.
    pub fn with_field_errors(field_errors: HashMap<String, Vec<Self>>) -> Self {
        Self {
            message: String::new(),
            code: String::new(),
            params: HashMap::new(),
            field_errors,
        }
    }

    /// Adds an interpolation parameter.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(key.into(), value.to_string());
        self
    }

    /// Returns the flattened list of messages, field errors prefixed by name.
    pub fn messages(&self) -> Vec<String> {
        let mut out = Vec::new();
        if !self.message.is_empty() {
            out.push(self.message.clone());
        }
        let mut fields: Vec<_> = self.field_errors.iter().collect();
        fields.sort_by(|a, b| a.0.cmp(b.0));
        for (field, errors) in fields {
            for error in errors {
                out.push(format!("{field}: {error}"));
            }
        }
        out
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.messages().join("; "))
    }
}

impl std::error::Error for ValidationError {}

/// The error type returned throughout django-core.
#[derive(Error, Debug)]
pub enum CoreError {
    // ── HTTP errors ──────────────────────────────────────────────────

    /// HTTP 400 Bad Request.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// HTTP 403 Forbidden.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// HTTP 404 Not Found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// HTTP 405 Method Not Allowed.
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    /// HTTP 500 Internal Server Error.
    #[error("Internal server error: {0}")]
    InternalServerError(String),

    // ── ORM errors ───────────────────────────────────────────────────

    /// A lookup expected exactly one object and found none.
    #[error("Object does not exist: {0}")]
    DoesNotExist(String),

    /// A lookup expected exactly one object and found several.
    #[error("Multiple objects returned when one expected: {0}")]
    MultipleObjectsReturned(String),

    /// A generic storage failure.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// A uniqueness or other integrity constraint was violated.
    #[error("Integrity error: {0}")]
    IntegrityError(String),

    /// The operation is refused for this object (e.g. saving a read-only model).
    #[error("Not allowed: {0}")]
    NotAllowed(String),

    /// Every token of the requested length is already taken.
    #[error("Token space exhausted: requested {requested} tokens but only {available} are free")]
    TokenSpaceExhausted {
        /// How many tokens the caller asked for.
        requested: usize,
        /// How many unused tokens remain for the requested length.
        available: u128,
    },

    // ── Validation ───────────────────────────────────────────────────

    /// One or more values failed validation.
    #[error("Validation error: {0}")]
    ValidationError(ValidationError),

    // ── Configuration ────────────────────────────────────────────────

    /// A setting is missing or refers to something that does not exist.
    #[error("Improperly configured: {0}")]
    ImproperlyConfigured(String),

    /// A configuration file could not be parsed.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    // ── Rendering and IO ─────────────────────────────────────────────

    /// A template failed to parse or render.
    #[error("Template error: {0}")]
    TemplateError(String),

    /// Serializing or deserializing a value failed.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An outbound HTTP request failed.
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CoreError {
    /// Returns the HTTP status code associated with this error.
    ///
    /// - `BadRequest`, `ValidationError` -> 400
    /// - `PermissionDenied`, `NotAllowed` -> 403
    /// - `NotFound`, `DoesNotExist` -> 404
    /// - `MethodNotAllowed` -> 405
    /// - everything else -> 500
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) | Self::ValidationError(_) => 400,
            Self::PermissionDenied(_) | Self::NotAllowed(_) => 403,
            Self::NotFound(_) | Self::DoesNotExist(_) => 404,
            Self::MethodNotAllowed(_) => 405,
            Self::InternalServerError(_)
            | Self::MultipleObjectsReturned(_)
            | Self::DatabaseError(_)
            | Self::IntegrityError(_)
            | Self::TokenSpaceExhausted { .. }
            | Self::ImproperlyConfigured(_)
            | Self::ConfigurationError(_)
            | Self::TemplateError(_)
            | Self::SerializationError(_)
            | Self::Http(_)
            | Self::IoError(_) => 500,
        }
    }

    /// Returns `true` for the "nothing matched" family of errors.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::DoesNotExist(_))
    }
}

impl From<ValidationError> for CoreError {
    fn from(err: ValidationError) -> Self {
        Self::ValidationError(err)
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

/// A convenience alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display_simple() {
        let err = ValidationError::new("This field is required.", "required");
        assert_eq!(err.to_string(), "This field is required.");
    }

    #[test]
    fn test_validation_error_display_field_errors() {
        let mut field_errors = HashMap::new();
        field_errors.insert(
            "password".to_string(),
            vec![ValidationError::new("Wrong password.", "password_incorrect")],
        );
        let err = ValidationError::with_field_errors(field_errors);
        assert_eq!(err.to_string(), "password: Wrong password.");
    }

    #[test]
    fn test_with_param_accepts_numbers() {
        let err = ValidationError::new("out of range", "invalid_out_of_range_min")
            .with_param("value", -1)
            .with_param("min", 0);
        assert_eq!(err.params["value"], "-1");
        assert_eq!(err.params["min"], "0");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(CoreError::BadRequest("x".into()).status_code(), 400);
        assert_eq!(CoreError::PermissionDenied("x".into()).status_code(), 403);
        assert_eq!(CoreError::NotAllowed("x".into()).status_code(), 403);
        assert_eq!(CoreError::NotFound("x".into()).status_code(), 404);
        assert_eq!(CoreError::DoesNotExist("x".into()).status_code(), 404);
        assert_eq!(CoreError::MethodNotAllowed("x".into()).status_code(), 405);
        assert_eq!(
            CoreError::TokenSpaceExhausted {
                requested: 3,
                available: 1
            }
            .status_code(),
            500
        );
        assert_eq!(
            CoreError::ValidationError(ValidationError::new("x", "y")).status_code(),
            400
        );
    }

    #[test]
    fn test_is_not_found() {
        assert!(CoreError::DoesNotExist("x".into()).is_not_found());
        assert!(CoreError::NotFound("x".into()).is_not_found());
        assert!(!CoreError::BadRequest("x".into()).is_not_found());
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: CoreError = json_err.into();
        assert_eq!(err.status_code(), 500);
        assert!(err.to_string().starts_with("Serialization error"));
    }
}
