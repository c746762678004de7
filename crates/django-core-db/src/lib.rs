//! # django-core-db
//!
//! Model layer for django-core. Provides the [`Model`](model::Model) trait,
//! the async [`ModelStore`](store::ModelStore) persistence seam with an
//! in-memory implementation, manager capabilities layered on top of any store,
//! and reusable model mixins.
//!
//! ## Architecture
//!
//! Persistence is a trait: any backend implementing
//! [`ModelStore`](store::ModelStore) gets every manager in [`managers`] through
//! blanket implementations, gated on the capabilities its model declares
//! ([`SlugModel`](managers::SlugModel), [`TokenModel`](mixins::TokenModel), ...).
//! Models run their pre-save processing in [`SavePrep`](hooks::SavePrep), used
//! by single saves and bulk creation alike.
//!
//! ## Module Overview
//!
//! - [`value`] - The [`Value`](value::Value) enum fields are read and written as
//! - [`query`] - Lookups and the [`Q`](query::Q) filter tree
//! - [`model`] - The [`Model`](model::Model) trait
//! - [`store`] - [`ModelStore`](store::ModelStore) and [`InMemoryStore`](store::InMemoryStore)
//! - [`hooks`] - Pre-save processing
//! - [`managers`] - Lookup helpers and unique token/slug generation
//! - [`mixins`] - Audit fields, soft delete, tokens, timestamps, links, generic objects
//! - [`fields`] - List, integer list and JSON fields stored as text
//! - [`token_authorization`] - Expiring authorization tokens

// needless_pass_by_value: Q and Vec arguments mirror the manager call style
// missing_errors_doc: every fallible fn returns CoreResult with self-describing variants
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::result_large_err)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::option_if_let_else)]

pub mod fields;
pub mod hooks;
pub mod managers;
pub mod mixins;
pub mod model;
pub mod query;
pub mod store;
pub mod token_authorization;
pub mod value;

pub use hooks::{save_model, SavePrep};
pub use managers::{
    BaseManager, CommonManager, GenericManager, SlugManager, SlugModel, TokenManager,
    UserManager, UserOwnedModel,
};
pub use model::Model;
pub use query::{Lookup, Q};
pub use store::{InMemoryStore, ModelStore};
pub use token_authorization::{
    AuthorizationPolicy, DefaultAuthorization, ReasonFilter, TokenAuthorization,
    TokenAuthorizationManager,
};
pub use value::{FromValue, Value};
