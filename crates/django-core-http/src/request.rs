//! HTTP request type.

use std::collections::HashMap;

use http::{HeaderMap, Method};
use serde::{Deserialize, Serialize};

use crate::querydict::QueryDict;

/// The user attached to a request by the authentication layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestUser {
    /// Primary key; `None` for anonymous users.
    pub id: Option<i64>,
    pub username: String,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl RequestUser {
    /// An anonymous user.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A logged in, non-staff user.
    pub fn authenticated(id: i64, username: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            username: username.into(),
            ..Self::default()
        }
    }

    /// Marks the user as staff.
    #[must_use]
    pub const fn staff(mut self) -> Self {
        self.is_staff = true;
        self
    }

    /// Marks the user as a superuser (and staff).
    #[must_use]
    pub const fn superuser(mut self) -> Self {
        self.is_staff = true;
        self.is_superuser = true;
        self
    }

    /// `true` for any logged in user.
    pub const fn is_authenticated(&self) -> bool {
        self.id.is_some()
    }
}

/// An incoming HTTP request.
///
/// # Examples
///
/// ```
/// use django_core_http::HttpRequest;
///
/// let request = HttpRequest::builder()
///     .method(http::Method::GET)
///     .path("/articles/")
///     .query_string("p=2")
///     .build();
///
/// assert_eq!(request.get().get("p"), Some("2"));
/// assert_eq!(request.get_full_path(), "/articles/?p=2");
/// assert!(!request.user().is_authenticated());
/// ```
#[derive(Debug, Clone)]
pub struct HttpRequest {
    method: Method,
    path: String,
    query_string: String,
    content_type: Option<String>,
    get: QueryDict,
    post: QueryDict,
    headers: HeaderMap,
    body: Vec<u8>,
    scheme: String,
    kwargs: HashMap<String, String>,
    user: RequestUser,
    session: HashMap<String, String>,
    timezone: Option<String>,
}

fn parse_post(content_type: Option<&str>, body: &[u8]) -> QueryDict {
    if content_type.is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded")) {
        QueryDict::parse(&String::from_utf8_lossy(body))
    } else {
        QueryDict::new()
    }
}

impl HttpRequest {
    /// Starts building a request.
    pub fn builder() -> HttpRequestBuilder {
        HttpRequestBuilder::default()
    }

    /// Creates a request from axum request parts and the collected body.
    pub fn from_axum(parts: http::request::Parts, body: Vec<u8>) -> Self {
        let headers = parts.headers;
        let content_type = headers
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let scheme = if headers
            .get("x-forwarded-proto")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == "https")
        {
            "https"
        } else {
            "http"
        };
        let query_string = parts.uri.query().unwrap_or("").to_string();

        Self {
            method: parts.method,
            path: parts.uri.path().to_string(),
            get: QueryDict::parse(&query_string),
            post: parse_post(content_type.as_deref(), &body),
            query_string,
            content_type,
            headers,
            body,
            scheme: scheme.to_string(),
            kwargs: HashMap::new(),
            user: RequestUser::anonymous(),
            session: HashMap::new(),
            timezone: None,
        }
    }

    pub const fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// The raw query string without the leading `?`.
    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Query string parameters.
    pub const fn get(&self) -> &QueryDict {
        &self.get
    }

    /// Form-encoded body parameters.
    pub const fn post(&self) -> &QueryDict {
        &self.post
    }

    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// A header value as text.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn is_secure(&self) -> bool {
        self.scheme == "https"
    }

    /// `true` when the request carries `X-Requested-With: XMLHttpRequest`.
    pub fn is_ajax(&self) -> bool {
        self.header("x-requested-with")
            .is_some_and(|v| v.eq_ignore_ascii_case("xmlhttprequest"))
    }

    /// The path followed by the query string, if any.
    pub fn get_full_path(&self) -> String {
        if self.query_string.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query_string)
        }
    }

    /// Parameters captured from the URL pattern.
    pub const fn kwargs(&self) -> &HashMap<String, String> {
        &self.kwargs
    }

    /// A URL parameter by name.
    pub fn kwarg(&self, name: &str) -> Option<&str> {
        self.kwargs.get(name).map(String::as_str)
    }

    /// Sets a URL parameter (used by routers).
    pub fn set_kwarg(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.kwargs.insert(name.into(), value.into());
    }

    /// The user making the request.
    pub const fn user(&self) -> &RequestUser {
        &self.user
    }

    /// Attaches the authenticated user.
    pub fn set_user(&mut self, user: RequestUser) {
        self.user = user;
    }

    /// Session data loaded by the session layer.
    pub const fn session(&self) -> &HashMap<String, String> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.session
    }

    /// The time zone activated for this request, `None` for the default.
    pub fn timezone(&self) -> Option<&str> {
        self.timezone.as_deref()
    }

    /// Activates (or with `None`, deactivates) a time zone for this request.
    pub fn set_timezone(&mut self, timezone: Option<String>) {
        self.timezone = timezone;
    }
}

/// Builder for [`HttpRequest`], mainly for tests.
#[derive(Debug)]
pub struct HttpRequestBuilder {
    method: Method,
    path: String,
    query_string: String,
    content_type: Option<String>,
    headers: HeaderMap,
    body: Vec<u8>,
    scheme: String,
    kwargs: HashMap<String, String>,
    user: RequestUser,
    session: HashMap<String, String>,
}

impl Default for HttpRequestBuilder {
    fn default() -> Self {
        Self {
            method: Method::GET,
            path: "/".to_string(),
            query_string: String::new(),
            content_type: None,
            headers: HeaderMap::new(),
            body: Vec::new(),
            scheme: "http".to_string(),
            kwargs: HashMap::new(),
            user: RequestUser::anonymous(),
            session: HashMap::new(),
        }
    }
}

impl HttpRequestBuilder {
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    #[must_use]
    pub fn path(mut self, path: &str) -> Self {
        self.path = path.to_string();
        self
    }

    /// Sets the query string (without leading `?`).
    #[must_use]
    pub fn query_string(mut self, qs: &str) -> Self {
        self.query_string = qs.to_string();
        self
    }

    #[must_use]
    pub fn content_type(mut self, ct: &str) -> Self {
        self.content_type = Some(ct.to_string());
        self
    }

    /// Adds a header; invalid names or values are ignored.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            http::header::HeaderName::from_bytes(name.as_bytes()),
            http::header::HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Marks the request as an AJAX call.
    #[must_use]
    pub fn ajax(self) -> Self {
        self.header("x-requested-with", "XMLHttpRequest")
    }

    #[must_use]
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Sets a form-encoded POST body.
    #[must_use]
    pub fn form(mut self, form: &str) -> Self {
        self.method = Method::POST;
        self.content_type = Some("application/x-www-form-urlencoded".to_string());
        self.body = form.as_bytes().to_vec();
        self
    }

    #[must_use]
    pub fn scheme(mut self, scheme: &str) -> Self {
        self.scheme = scheme.to_string();
        self
    }

    /// Adds a URL parameter.
    #[must_use]
    pub fn kwarg(mut self, name: &str, value: &str) -> Self {
        self.kwargs.insert(name.to_string(), value.to_string());
        self
    }

    #[must_use]
    pub fn user(mut self, user: RequestUser) -> Self {
        self.user = user;
        self
    }

    /// Adds a session entry.
    #[must_use]
    pub fn session(mut self, key: &str, value: &str) -> Self {
        self.session.insert(key.to_string(), value.to_string());
        self
    }

    pub fn build(self) -> HttpRequest {
        HttpRequest {
            get: QueryDict::parse(&self.query_string),
            post: parse_post(self.content_type.as_deref(), &self.body),
            method: self.method,
            path: self.path,
            query_string: self.query_string,
            content_type: self.content_type,
            headers: self.headers,
            body: self.body,
            scheme: self.scheme,
            kwargs: self.kwargs,
            user: self.user,
            session: self.session,
            timezone: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let req = HttpRequest::builder().build();
        assert_eq!(req.method(), &Method::GET);
        assert_eq!(req.path(), "/");
        assert!(req.content_type().is_none());
        assert!(!req.is_secure());
        assert!(!req.is_ajax());
        assert!(req.timezone().is_none());
    }

    #[test]
    fn test_is_ajax() {
        let req = HttpRequest::builder().ajax().build();
        assert!(req.is_ajax());
        let req = HttpRequest::builder()
            .header("x-requested-with", "xmlhttprequest")
            .build();
        assert!(req.is_ajax());
    }

    #[test]
    fn test_form_body_is_parsed() {
        let req = HttpRequest::builder().form("title=Hi+there&tags=a&tags=b").build();
        assert_eq!(req.method(), &Method::POST);
        assert_eq!(req.post().get("title"), Some("Hi there"));
        assert_eq!(req.post().get_list("tags"), vec!["a", "b"]);
    }

    #[test]
    fn test_json_body_is_not_parsed_as_form() {
        let req = HttpRequest::builder()
            .method(Method::POST)
            .content_type("application/json")
            .body(b"{\"a\": 1}".to_vec())
            .build();
        assert!(req.post().is_empty());
        assert_eq!(req.body(), b"{\"a\": 1}");
    }

    #[test]
    fn test_from_axum() {
        let (parts, ()) = http::Request::builder()
            .method(Method::POST)
            .uri("/submit/?next=/done/")
            .header("content-type", "application/x-www-form-urlencoded")
            .header("x-forwarded-proto", "https")
            .body(())
            .unwrap()
            .into_parts();
        let req = HttpRequest::from_axum(parts, b"name=value".to_vec());
        assert_eq!(req.path(), "/submit/");
        assert_eq!(req.get().get("next"), Some("/done/"));
        assert_eq!(req.post().get("name"), Some("value"));
        assert!(req.is_secure());
    }

    #[test]
    fn test_user_and_kwargs() {
        let mut req = HttpRequest::builder()
            .kwarg("object_id", "4")
            .user(RequestUser::authenticated(1, "ann").staff())
            .build();
        assert_eq!(req.kwarg("object_id"), Some("4"));
        assert!(req.user().is_authenticated());
        assert!(req.user().is_staff);
        assert!(!req.user().is_superuser);
        req.set_user(RequestUser::anonymous());
        assert!(!req.user().is_authenticated());
    }
}
