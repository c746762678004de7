//! JSON responses and form validation for APIs.

use async_trait::async_trait;
use django_core_forms::Form;
use django_core_http::{HttpRequest, HttpResponse, JsonResponse, QueryDict};
use http::StatusCode;

use crate::view::{Context, View};

/// Renders a context as JSON.
///
/// Top level `form` and `view` keys are dropped: they hold the machinery
/// that produced the context, not data for the client.
///
/// ```
/// use django_core_views::mixins::JsonResponseMixin;
///
/// let response = JsonResponseMixin::render_to_response(
///     serde_json::json!({"form": {}, "view": "x", "count": 2}),
/// );
/// assert_eq!(response.text(), r#"{"count":2}"#);
/// assert_eq!(response.full_content_type(), "application/json; charset=utf-8");
/// ```
pub struct JsonResponseMixin;

impl JsonResponseMixin {
    pub const EXCLUDED_KEYS: [&'static str; 2] = ["form", "view"];

    pub fn render_to_response(content: serde_json::Value) -> HttpResponse {
        Self::get_json_response(content, StatusCode::OK)
    }

    pub fn get_json_response(mut content: serde_json::Value, status: StatusCode) -> HttpResponse {
        if let serde_json::Value::Object(map) = &mut content {
            for key in Self::EXCLUDED_KEYS {
                map.remove(key);
            }
        }
        JsonResponse::with_status(status, &content)
    }
}

/// The form handling behind an [`ApiFormView`].
#[async_trait]
pub trait ApiFormHandler: Send + Sync {
    type Form: Form;

    /// A fresh, unbound form.
    fn get_form(&self, request: &HttpRequest) -> Self::Form;

    /// The data the form validates; the query string by default.
    fn get_initial(&self, request: &HttpRequest) -> QueryDict {
        request.get().copy()
    }

    async fn form_valid(&self, request: HttpRequest, form: Self::Form) -> HttpResponse;

    /// A 400 JSON response carrying the form's errors under `errors`, plus
    /// any extra `context`.
    fn form_invalid(&self, form: &Self::Form, context: Option<Context>) -> HttpResponse {
        let mut context = context.unwrap_or_default();
        context.insert(
            "errors".into(),
            serde_json::to_value(form.errors()).unwrap_or_default(),
        );
        JsonResponseMixin::get_json_response(
            serde_json::Value::Object(context),
            StatusCode::BAD_REQUEST,
        )
    }
}

/// Validates GET query strings with a form and answers in JSON.
pub struct ApiFormView<H> {
    handler: H,
}

impl<H: ApiFormHandler> ApiFormView<H> {
    pub const fn new(handler: H) -> Self {
        Self { handler }
    }

    pub const fn handler(&self) -> &H {
        &self.handler
    }
}

#[async_trait]
impl<H: ApiFormHandler> View for ApiFormView<H> {
    fn allowed_methods(&self) -> Vec<http::Method> {
        vec![http::Method::GET, http::Method::HEAD, http::Method::OPTIONS]
    }

    async fn get(&self, request: HttpRequest) -> HttpResponse {
        let mut form = self.handler.get_form(&request);
        form.bind(&self.handler.get_initial(&request));
        if form.is_valid().await {
            self.handler.form_valid(request, form).await
        } else {
            tracing::debug!(errors = ?form.errors(), "api form invalid");
            self.handler.form_invalid(&form, None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_object_content_is_kept() {
        let response = JsonResponseMixin::render_to_response(serde_json::json!([1, 2]));
        assert_eq!(response.text(), "[1,2]");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_status_is_kept() {
        let response = JsonResponseMixin::get_json_response(
            serde_json::json!({"view": 1}),
            StatusCode::CREATED,
        );
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.text(), "{}");
    }
}
