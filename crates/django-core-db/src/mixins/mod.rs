//! Reusable model behavior.
//!
//! Each mixin is a trait (plus, where it owns fields, a struct the model
//! embeds). Models opt into the capabilities they need and compose the
//! matching `*_save_prep` helpers inside their own
//! [`SavePrep`](crate::hooks::SavePrep) implementation.

pub mod base;
pub mod crud;
pub mod dates;
pub mod generic;
pub mod http;
pub mod tokens;
pub mod urls;

pub use base::{AbstractBaseModel, AuditFields};
pub use crud::{with_deleted_filter, ReadOnly, SafeDeleteModel, SafeDeleteQuerySet};
pub use dates::{DateTimeFields, DateTimeTracking, Expires};
pub use generic::{ContentType, ContentTypeRegistry, GenericObject};
pub use http::{HttpStatus, HttpStatusFields};
pub use tokens::{assign_tokens, TokenModel};
pub use urls::{LinkOptions, UrlLink};
