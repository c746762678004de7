//! HTTP response types.
//!
//! [`HttpResponse`] plus unit structs whose `new` builds a response with a
//! fixed status (`HttpResponseRedirect::new(url)`, `JsonResponse::new(&data)`,
//! ...). Every response converts into an axum response.

use std::borrow::Cow;

use axum::response::IntoResponse;
use django_core_common::error::CoreError;
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, StatusCode};

/// An HTTP response.
///
/// # Examples
///
/// ```
/// use django_core_http::HttpResponse;
///
/// let response = HttpResponse::ok("Hello");
/// assert_eq!(response.status(), http::StatusCode::OK);
/// assert_eq!(response.text(), "Hello");
/// assert_eq!(response.full_content_type(), "text/html; charset=utf-8");
/// ```
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: StatusCode,
    headers: HeaderMap,
    content: Vec<u8>,
    charset: String,
    content_type: String,
}

impl HttpResponse {
    /// A `text/html` response with the given status and body.
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            content: body.into().into_bytes(),
            charset: "utf-8".to_string(),
            content_type: "text/html".to_string(),
        }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, body)
    }

    pub fn not_found(body: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, body)
    }

    pub fn forbidden(body: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, body)
    }

    pub fn bad_request(body: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, body)
    }

    pub fn server_error(body: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, body)
    }

    /// A 405 response whose `Allow` header lists `permitted_methods`.
    pub fn not_allowed<S: AsRef<str>>(permitted_methods: &[S]) -> Self {
        let allow = permitted_methods
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(", ");
        let mut response = Self::new(StatusCode::METHOD_NOT_ALLOWED, "");
        response.insert_header(http::header::ALLOW, &allow);
        response
    }

    pub const fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// A header value as text.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    fn insert_header(&mut self, name: HeaderName, value: &str) {
        match HeaderValue::from_str(value) {
            Ok(value) => {
                self.headers.insert(name, value);
            }
            Err(_) => tracing::warn!(header = %name, "dropping invalid header value"),
        }
    }

    /// Sets a header; invalid names or values are dropped with a warning.
    pub fn set_header(&mut self, name: &str, value: &str) {
        match HeaderName::from_bytes(name.as_bytes()) {
            Ok(name) => self.insert_header(name, value),
            Err(_) => tracing::warn!(header = name, "dropping invalid header name"),
        }
    }

    /// Builder form of [`Self::set_header`].
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.set_header(name, value);
        self
    }

    pub fn charset(&self) -> &str {
        &self.charset
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.content_type = content_type.into();
    }

    /// The raw body.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// The body decoded as UTF-8, lossily.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }

    /// The `Content-Type` header value, with the charset for text and JSON.
    pub fn full_content_type(&self) -> String {
        if self.content_type.contains("charset=") {
            self.content_type.clone()
        } else if self.content_type.starts_with("text/") || self.content_type.contains("json") {
            format!("{}; charset={}", self.content_type, self.charset)
        } else {
            self.content_type.clone()
        }
    }
}

impl From<CoreError> for HttpResponse {
    fn from(err: CoreError) -> Self {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(error = %err, "request failed");
            Self::new(status, "Internal Server Error")
        } else {
            tracing::debug!(error = %err, status = status.as_u16(), "request rejected");
            Self::new(status, err.to_string())
        }
    }
}

impl IntoResponse for HttpResponse {
    fn into_response(self) -> axum::response::Response {
        let content_type = self.full_content_type();
        let mut response = axum::response::Response::new(axum::body::Body::from(self.content));
        *response.status_mut() = self.status;
        if let Ok(value) = HeaderValue::from_str(&content_type) {
            response
                .headers_mut()
                .insert(http::header::CONTENT_TYPE, value);
        }
        for (key, value) in &self.headers {
            response.headers_mut().insert(key, value.clone());
        }
        response
    }
}

/// A JSON response.
pub struct JsonResponse;

impl JsonResponse {
    /// A 200 response with `data` serialized as JSON.
    pub fn new<T: serde::Serialize + ?Sized>(data: &T) -> HttpResponse {
        Self::with_status(StatusCode::OK, data)
    }

    /// A JSON response with a custom status.
    pub fn with_status<T: serde::Serialize + ?Sized>(status: StatusCode, data: &T) -> HttpResponse {
        match serde_json::to_string(data) {
            Ok(json) => {
                let mut response = HttpResponse::new(status, json);
                response.set_content_type("application/json");
                response
            }
            Err(e) => HttpResponse::from(CoreError::SerializationError(e.to_string())),
        }
    }
}

/// A 302 redirect.
pub struct HttpResponseRedirect;

impl HttpResponseRedirect {
    pub fn new(url: &str) -> HttpResponse {
        let mut response = HttpResponse::new(StatusCode::FOUND, "");
        response.insert_header(http::header::LOCATION, url);
        response
    }
}

/// A 404 response.
pub struct HttpResponseNotFound;

impl HttpResponseNotFound {
    pub fn new(body: impl Into<String>) -> HttpResponse {
        HttpResponse::not_found(body)
    }
}

/// A 403 response.
pub struct HttpResponseForbidden;

impl HttpResponseForbidden {
    pub fn new(body: impl Into<String>) -> HttpResponse {
        HttpResponse::forbidden(body)
    }
}

/// A 400 response.
pub struct HttpResponseBadRequest;

impl HttpResponseBadRequest {
    pub fn new(body: impl Into<String>) -> HttpResponse {
        HttpResponse::bad_request(body)
    }
}

/// A 405 response.
pub struct HttpResponseNotAllowed;

impl HttpResponseNotAllowed {
    pub fn new<S: AsRef<str>>(permitted_methods: &[S]) -> HttpResponse {
        HttpResponse::not_allowed(permitted_methods)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[test]
    fn test_json_response() {
        let response = JsonResponse::new(&serde_json::json!({"ok": true}));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.text(), r#"{"ok":true}"#);
        assert_eq!(response.full_content_type(), "application/json; charset=utf-8");

        let response = JsonResponse::with_status(StatusCode::BAD_REQUEST, &vec![1, 2]);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.text(), "[1,2]");
    }

    #[test]
    fn test_redirect() {
        let response = HttpResponseRedirect::new("/next/");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.header("location"), Some("/next/"));
    }

    #[test]
    fn test_not_allowed() {
        let response = HttpResponseNotAllowed::new(&["GET", "POST"]);
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.header("allow"), Some("GET, POST"));
    }

    #[test]
    fn test_from_core_error() {
        let response = HttpResponse::from(CoreError::NotFound("No article".into()));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.text(), "Not found: No article");

        let response = HttpResponse::from(CoreError::DatabaseError("secret detail".into()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!response.text().contains("secret"));
    }

    #[test]
    fn test_invalid_header_is_dropped() {
        let response = HttpResponse::ok("").with_header("x-ok", "1").with_header("bad name", "1");
        assert_eq!(response.header("x-ok"), Some("1"));
        assert_eq!(response.headers().len(), 1);
    }

    #[tokio::test]
    async fn test_into_axum_response() {
        let response = HttpResponse::ok("<p>hi</p>")
            .with_header("x-ua-compatible", "IE=edge")
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["content-type"],
            "text/html; charset=utf-8"
        );
        assert_eq!(response.headers()["x-ua-compatible"], "IE=edge");
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"<p>hi</p>");
    }
}
