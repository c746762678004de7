//! # django-core
//!
//! Reusable building blocks for web applications: audited and soft-deletable
//! models, expiring authorization tokens, view mixins, form fields, template
//! filters and templated email.
//!
//! This is the meta-crate that re-exports every sub-crate. Depend on it to get
//! everything, or on the individual crates for finer-grained control.

/// Errors, settings, logging and small utilities.
pub use django_core_common as common;

/// Models, stores, managers, model mixins and token authorizations.
#[cfg(feature = "db")]
pub use django_core_db as db;

/// Requests, responses, query dicts and redirects.
#[cfg(feature = "http")]
pub use django_core_http as http;

/// Form fields, widgets and form mixins.
#[cfg(feature = "forms")]
pub use django_core_forms as forms;

/// Template filters and tags.
#[cfg(feature = "template")]
pub use django_core_template as template;

/// Views, view mixins, decorators, middleware and admin policies.
#[cfg(feature = "views")]
pub use django_core_views as views;

/// Email messages, backends and templated email.
#[cfg(feature = "mail")]
pub use django_core_mail as mail;

/// Users, password hashing and the email-or-username backend.
#[cfg(feature = "auth")]
pub use django_core_auth as auth;

pub use django_core_common::{CoreError, CoreResult, CoreSettings};

// Third-party re-exports
pub use async_trait;
pub use axum;
pub use chrono;
pub use serde;
pub use serde_json;
pub use tokio;
pub use tracing;
pub use tracing_subscriber;
