//! # django-core-mail
//!
//! Email messages, pluggable [`EmailBackend`]s and helpers that render a
//! message's text and HTML bodies from tera templates before sending one
//! copy per recipient.
//!
//! ```
//! # tokio_test::block_on(async {
//! use django_core_common::CoreSettings;
//! use django_core_mail::{send_emails_from_template, InMemoryBackend, TemplateEmail};
//!
//! let mut tera = tera::Tera::default();
//! tera.add_raw_template("hi.txt", "Hi {{ name }}").unwrap();
//! tera.add_raw_template("hi.html", "<p>Hi {{ name }}</p>").unwrap();
//!
//! let backend = InMemoryBackend::new();
//! let email = TemplateEmail::text_and_html("Hi", "hi.txt", "hi.html").insert("name", "Ann");
//! let sent = send_emails_from_template(
//!     &["a@example.com", "b@example.com"],
//!     &email,
//!     &tera,
//!     &CoreSettings::default(),
//!     &backend,
//! )
//! .await
//! .unwrap();
//! assert_eq!(sent, 2);
//! assert_eq!(backend.outbox().await[1].body, "Hi Ann");
//! # });
//! ```

#![allow(clippy::missing_errors_doc)]

pub mod backends;
pub mod message;
pub mod sending;

pub use backends::{
    backend_from_settings, ConsoleBackend, DummyBackend, EmailBackend, InMemoryBackend,
    SmtpBackend,
};
pub use message::{Attachment, EmailMessage};
pub use sending::{
    markdown_to_html, register_templates, send_email_from_template, send_emails_from_template, EmailTemplates,
    TemplateEmail, BASE_EMAIL_TEMPLATE_NAME,
};
