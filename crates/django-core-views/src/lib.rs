//! # django-core-views
//!
//! The [`View`] trait with per-method dispatch, reusable view mixins, a
//! method [`Dispatcher`], view decorators, middleware and admin policies.
//!
//! ## Module Overview
//!
//! - [`view`] - [`View`], view functions, [`ViewContext`] and template rendering
//! - [`dispatcher`] - Routes each HTTP method to its own handler
//! - [`mixins`] - Login/staff/creator checks, paging, ajax, JSON responses,
//!   query string aliases, generic objects, authorization tokens
//! - [`decorators`] - `turn_emails_off`
//! - [`middleware`] - The middleware pipeline, IE compatibility and time zones
//! - [`admin`] - Admin configuration and the read-only policy

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::result_large_err)]

pub mod admin;
pub mod decorators;
pub mod dispatcher;
pub mod middleware;
pub mod mixins;
pub mod view;

pub use admin::{AdminPolicy, ModelAdmin, ReadOnlyModelAdmin};
pub use decorators::turn_emails_off;
pub use dispatcher::Dispatcher;
pub use middleware::{IeCompatibleMiddleware, Middleware, MiddlewarePipeline, TimezoneMiddleware};
pub use view::{
    render_template, serve_axum, Context, ContextViewFunction, View, ViewContext, ViewFunction,
};
