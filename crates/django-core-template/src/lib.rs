//! # django-core-template
//!
//! Template filters (`getitem`, `multiply`, `linebreaks_safe`, url links, ...)
//! and simple tags (`utcnow`, `utcnow_timestamp`).
//!
//! Filters operate on [`ContextValue`]s and are grouped in a [`Library`].
//! [`register_tera`] installs the default library into a [`tera::Tera`]
//! engine:
//!
//! ```
//! let mut tera = tera::Tera::default();
//! django_core_template::register_tera(&mut tera);
//!
//! let mut ctx = tera::Context::new();
//! ctx.insert("n", &6);
//! let out = tera
//!     .render_str("{{ n | multiply(by=7) }} {{ n | substract(by=10) | absolute }}", &ctx)
//!     .unwrap();
//! assert_eq!(out, "42 4");
//! ```

pub mod context;
pub mod filters;
pub mod library;

pub use context::{url_link_context, ContextValue};
pub use filters::Filter;
pub use library::{register_tera, Library, SimpleTagFn};
