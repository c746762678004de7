//! # django-core-common
//!
//! Shared foundation for the django-core crates: the error enum, the explicit
//! settings struct, logging setup and a grab bag of small utilities.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`settings`] - Explicit configuration passed to every component
//! - [`logging`] - Tracing-based logging integration
//! - [`utils`] - Random tokens, dates, URLs, validators, HTML builders and more

pub mod error;
pub mod logging;
pub mod settings;
pub mod utils;

pub use error::{CoreError, CoreResult, ValidationError};
pub use settings::CoreSettings;
