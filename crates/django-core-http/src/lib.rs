//! # django-core-http
//!
//! Request and response types shared by the view layer. Provides
//! [`HttpRequest`] (with its [`QueryDict`]s and the attached [`RequestUser`]),
//! [`HttpResponse`] and its shortcut constructors, and [`safe_redirect`].
//! Every response converts into an axum response.

pub mod querydict;
pub mod request;
pub mod response;
pub mod shortcuts;

pub use querydict::QueryDict;
pub use request::{HttpRequest, HttpRequestBuilder, RequestUser};
pub use response::{
    HttpResponse, HttpResponseBadRequest, HttpResponseForbidden, HttpResponseNotAllowed,
    HttpResponseNotFound, HttpResponseRedirect, JsonResponse,
};
pub use shortcuts::{redirect, safe_redirect};
