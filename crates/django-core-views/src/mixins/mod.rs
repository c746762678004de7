//! View mixins.
//!
//! Checks that run before a view (login, staff, ajax, token) are wrappers
//! implementing [`View`](crate::View) around the view they guard. Helpers
//! that compute per-request values (paging, query aliases, generic objects)
//! are plain structs the view calls.

pub mod ajax;
pub mod auth;
pub mod common;
pub mod csrf;
pub mod generic;
pub mod paging;
pub mod query;
pub mod response;
pub mod tokens;

pub use ajax::{AjaxViewMixin, RequiresAjax};
pub use auth::{CreatorRequired, LoginRequired, StaffRequired, SuperuserRequired};
pub use common::{CommonSingleObjectViewMixin, ObjectView, SingleObject};
pub use csrf::CsrfExempt;
pub use generic::{ContentObject, ContentObjectLoader, GenericObjectViewMixin, StoreLoader};
pub use paging::{Paging, PagingViewMixin};
pub use query::QueryStringAliasViewMixin;
pub use response::{ApiFormHandler, ApiFormView, JsonResponseMixin};
pub use tokens::{add_authorization_to_context, AuthorizationTokenRequiredViewMixin, AuthorizedView};
