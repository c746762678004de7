//! Decorators for view functions.

use std::sync::Arc;

use django_core_common::settings::EmailBackendKind;
use django_core_http::HttpRequest;

use crate::view::{ContextViewFunction, ViewContext};

/// Wraps a view so that no email it sends leaves the process.
///
/// The view runs with a copy of the settings whose email backend is
/// [`EmailBackendKind::Dummy`]; the caller's settings are not touched.
///
/// ```
/// use std::sync::Arc;
/// use django_core_common::settings::EmailBackendKind;
/// use django_core_http::{HttpRequest, HttpResponse};
/// use django_core_views::decorators::turn_emails_off;
/// use django_core_views::{ContextViewFunction, ViewContext};
///
/// let view: ContextViewFunction = Arc::new(|_req, ctx: ViewContext| {
///     Box::pin(async move {
///         HttpResponse::ok(format!("{:?}", ctx.settings.email_backend))
///     })
/// });
/// let quiet = turn_emails_off(view);
///
/// let response = tokio_test::block_on(quiet(HttpRequest::builder().build(), ViewContext::default()));
/// assert_eq!(response.text(), "Dummy");
/// ```
pub fn turn_emails_off(view: ContextViewFunction) -> ContextViewFunction {
    Arc::new(move |request: HttpRequest, context: ViewContext| {
        let context = context.with_settings(|settings| {
            settings.email_backend = EmailBackendKind::Dummy;
        });
        tracing::debug!(path = request.path(), "emails turned off for view");
        view(request, context)
    })
}
