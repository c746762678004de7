//! Utility functions shared by the django-core crates.
//!
//! - [`random`]: unambiguous random alphanumeric strings
//! - [`list`]: one-or-many normalization and dot-notation lookups
//! - [`numbers`]: compact number formatting
//! - [`files`]: file path decomposition
//! - [`dates`]: time zone conversion and lenient date parsing
//! - [`text`]: slugs and HTML escaping
//! - [`urls`]: redirect safety and query string manipulation
//! - [`validators`]: email and password checks
//! - [`html`]: small HTML element builders
//! - [`connections`]: outbound connectivity checks and JSON fetches

pub mod connections;
pub mod dates;
pub mod files;
pub mod html;
pub mod list;
pub mod numbers;
pub mod random;
pub mod text;
pub mod urls;
pub mod validators;
