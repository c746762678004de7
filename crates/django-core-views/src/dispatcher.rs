//! Method based dispatch of function views.

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use django_core_http::{HttpRequest, HttpResponse};

use crate::view::{View, ViewFunction};

/// Maps HTTP methods to view functions.
///
/// Requests for a method without a handler get a 405 whose `Allow` header
/// lists the methods that have one.
///
/// ```
/// # tokio_test::block_on(async {
/// use django_core_http::{HttpRequest, HttpResponse};
/// use django_core_views::{Dispatcher, View};
///
/// let dispatcher = Dispatcher::new()
///     .get(Box::new(|_req| Box::pin(async { HttpResponse::ok("list") })))
///     .post(Box::new(|_req| Box::pin(async { HttpResponse::ok("created") })));
///
/// let request = HttpRequest::builder().method(http::Method::DELETE).build();
/// let response = dispatcher.dispatch(request).await;
/// assert_eq!(response.status(), http::StatusCode::METHOD_NOT_ALLOWED);
/// assert_eq!(response.header("allow"), Some("GET, POST"));
/// # });
/// ```
#[derive(Default)]
pub struct Dispatcher {
    handlers: BTreeMap<String, ViewFunction>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes `method` to `handler`, replacing any previous handler.
    #[must_use]
    pub fn handler(mut self, method: &http::Method, handler: ViewFunction) -> Self {
        self.handlers.insert(method.as_str().to_string(), handler);
        self
    }

    #[must_use]
    pub fn get(self, handler: ViewFunction) -> Self {
        self.handler(&http::Method::GET, handler)
    }

    #[must_use]
    pub fn post(self, handler: ViewFunction) -> Self {
        self.handler(&http::Method::POST, handler)
    }

    #[must_use]
    pub fn put(self, handler: ViewFunction) -> Self {
        self.handler(&http::Method::PUT, handler)
    }

    #[must_use]
    pub fn delete(self, handler: ViewFunction) -> Self {
        self.handler(&http::Method::DELETE, handler)
    }

    pub fn has_handler(&self, method: &http::Method) -> bool {
        self.handlers.contains_key(method.as_str())
    }
}

#[async_trait]
impl View for Dispatcher {
    fn allowed_methods(&self) -> Vec<http::Method> {
        self.handlers
            .keys()
            .filter_map(|m| http::Method::from_bytes(m.as_bytes()).ok())
            .collect()
    }

    async fn dispatch(&self, request: HttpRequest) -> HttpResponse {
        match self.handlers.get(request.method().as_str()) {
            Some(handler) => handler(request).await,
            None => self.http_method_not_allowed(request).await,
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("methods", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}
