//! The [`View`] trait, view functions and template rendering.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use axum::response::IntoResponse;
use django_core_common::error::CoreError;
use django_core_common::settings::CoreSettings;
use django_core_http::{HttpRequest, HttpResponse};
use tracing::Instrument;

/// Template context passed between views and mixins.
pub type Context = serde_json::Map<String, serde_json::Value>;

/// An async view function.
pub type ViewFunction =
    Box<dyn Fn(HttpRequest) -> Pin<Box<dyn Future<Output = HttpResponse> + Send>> + Send + Sync>;

/// An async view function that also receives the [`ViewContext`].
pub type ContextViewFunction = Arc<
    dyn Fn(HttpRequest, ViewContext) -> Pin<Box<dyn Future<Output = HttpResponse> + Send>>
        + Send
        + Sync,
>;

/// What a view needs besides the request: the settings in effect.
#[derive(Debug, Clone, Default)]
pub struct ViewContext {
    pub settings: Arc<CoreSettings>,
}

impl ViewContext {
    pub fn new(settings: CoreSettings) -> Self {
        Self {
            settings: Arc::new(settings),
        }
    }

    /// A context whose settings are `f` applied to a copy of the current ones.
    #[must_use]
    pub fn with_settings(&self, f: impl FnOnce(&mut CoreSettings)) -> Self {
        let mut settings = (*self.settings).clone();
        f(&mut settings);
        Self::new(settings)
    }
}

/// A class-based view: requests are dispatched to one handler per method.
///
/// Every handler answers 405 unless overridden; `HEAD` falls back to `GET`.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use django_core_http::{HttpRequest, HttpResponse};
/// use django_core_views::View;
///
/// struct Hello;
///
/// #[async_trait]
/// impl View for Hello {
///     fn allowed_methods(&self) -> Vec<http::Method> {
///         vec![http::Method::GET]
///     }
///
///     async fn get(&self, _request: HttpRequest) -> HttpResponse {
///         HttpResponse::ok("hello")
///     }
/// }
/// ```
#[async_trait]
pub trait View: Send + Sync {
    /// Methods listed in the `Allow` header of 405 responses.
    fn allowed_methods(&self) -> Vec<http::Method> {
        vec![
            http::Method::GET,
            http::Method::POST,
            http::Method::PUT,
            http::Method::PATCH,
            http::Method::DELETE,
            http::Method::HEAD,
            http::Method::OPTIONS,
        ]
    }

    /// Whether CSRF checks should be skipped for this view.
    fn csrf_exempt(&self) -> bool {
        false
    }

    async fn dispatch(&self, request: HttpRequest) -> HttpResponse {
        match *request.method() {
            http::Method::GET => self.get(request).await,
            http::Method::POST => self.post(request).await,
            http::Method::PUT => self.put(request).await,
            http::Method::PATCH => self.patch(request).await,
            http::Method::DELETE => self.delete(request).await,
            http::Method::HEAD => self.head(request).await,
            http::Method::OPTIONS => self.options(request).await,
            _ => self.http_method_not_allowed(request).await,
        }
    }

    async fn get(&self, request: HttpRequest) -> HttpResponse {
        self.http_method_not_allowed(request).await
    }

    async fn post(&self, request: HttpRequest) -> HttpResponse {
        self.http_method_not_allowed(request).await
    }

    async fn put(&self, request: HttpRequest) -> HttpResponse {
        self.http_method_not_allowed(request).await
    }

    async fn patch(&self, request: HttpRequest) -> HttpResponse {
        self.http_method_not_allowed(request).await
    }

    async fn delete(&self, request: HttpRequest) -> HttpResponse {
        self.http_method_not_allowed(request).await
    }

    async fn head(&self, request: HttpRequest) -> HttpResponse {
        self.get(request).await
    }

    /// An empty 200 listing the allowed methods.
    async fn options(&self, _request: HttpRequest) -> HttpResponse {
        let methods = self.allowed_methods();
        let allow = method_list(&methods);
        HttpResponse::ok("").with_header("allow", &allow.join(", "))
    }

    async fn http_method_not_allowed(&self, request: HttpRequest) -> HttpResponse {
        tracing::debug!(method = %request.method(), path = request.path(), "method not allowed");
        HttpResponse::not_allowed(&method_list(&self.allowed_methods()))
    }

    /// Boxes this view as a [`ViewFunction`].
    #[allow(clippy::wrong_self_convention)]
    fn as_view(self) -> ViewFunction
    where
        Self: Sized + 'static,
    {
        let view = Arc::new(self);
        Box::new(move |request: HttpRequest| {
            let view = Arc::clone(&view);
            Box::pin(async move { view.dispatch(request).await })
        })
    }
}

fn method_list(methods: &[http::Method]) -> Vec<&str> {
    methods.iter().map(http::Method::as_str).collect()
}

/// Serves an axum request with `view`.
pub async fn serve_axum<V: View + ?Sized>(
    view: &V,
    request: axum::extract::Request,
) -> axum::response::Response {
    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes.to_vec(),
        Err(e) => {
            return HttpResponse::from(CoreError::BadRequest(e.to_string())).into_response();
        }
    };
    let request = HttpRequest::from_axum(parts, body);
    let span = django_core_common::logging::request_span(request.method().as_str(), request.path());
    view.dispatch(request).instrument(span).await.into_response()
}

/// Renders `template_name` with `context`; render failures become a 500.
pub fn render_template(engine: &tera::Tera, template_name: &str, context: &Context) -> HttpResponse {
    let rendered = tera::Context::from_serialize(context)
        .and_then(|ctx| engine.render(template_name, &ctx));
    match rendered {
        Ok(html) => HttpResponse::ok(html),
        Err(e) => HttpResponse::from(CoreError::TemplateError(format!(
            "{template_name}: {e}"
        ))),
    }
}
