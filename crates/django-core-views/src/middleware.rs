//! Request/response middleware.
//!
//! Middleware runs in order for requests (first added = first to process)
//! and in reverse order for responses.

use async_trait::async_trait;
use django_core_common::utils::dates::parse_timezone;
use django_core_http::{HttpRequest, HttpResponse};

use crate::view::ViewFunction;

/// A component that can inspect or modify requests and responses.
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Runs before the view. Returning a response skips the view.
    async fn process_request(&self, _request: &mut HttpRequest) -> Option<HttpResponse> {
        None
    }

    /// Runs after the view, in reverse middleware order.
    async fn process_response(
        &self,
        _request: &HttpRequest,
        response: HttpResponse,
    ) -> HttpResponse {
        response
    }
}

/// An ordered list of middleware wrapped around a view.
#[derive(Default)]
pub struct MiddlewarePipeline {
    middlewares: Vec<Box<dyn Middleware>>,
}

impl MiddlewarePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, middleware: impl Middleware + 'static) {
        self.middlewares.push(Box::new(middleware));
    }

    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    /// Runs `request` through every middleware and `handler`.
    ///
    /// When a middleware short-circuits, only the middleware that already
    /// saw the request get to process the response.
    pub async fn process(&self, mut request: HttpRequest, handler: &ViewFunction) -> HttpResponse {
        for (i, mw) in self.middlewares.iter().enumerate() {
            if let Some(mut response) = mw.process_request(&mut request).await {
                for seen in self.middlewares[..=i].iter().rev() {
                    response = seen.process_response(&request, response).await;
                }
                return response;
            }
        }

        let mut response = handler(request.clone()).await;
        for mw in self.middlewares.iter().rev() {
            response = mw.process_response(&request, response).await;
        }
        response
    }
}

impl std::fmt::Debug for MiddlewarePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewarePipeline")
            .field("middleware_count", &self.middlewares.len())
            .finish()
    }
}

// ── IeCompatibleMiddleware ──────────────────────────────────────────

/// Sets `X-UA-Compatible: IE=edge` on HTML responses.
#[derive(Debug, Clone, Copy, Default)]
pub struct IeCompatibleMiddleware;

#[async_trait]
impl Middleware for IeCompatibleMiddleware {
    async fn process_response(
        &self,
        _request: &HttpRequest,
        mut response: HttpResponse,
    ) -> HttpResponse {
        if response.content_type().contains("text/html") {
            response.set_header("X-UA-Compatible", "IE=edge");
        }
        response
    }
}

// ── TimezoneMiddleware ──────────────────────────────────────────────

/// Activates the time zone stored in the session under `user_timezone`.
///
/// Unknown or missing zones fall back to the default (UTC).
#[derive(Debug, Clone, Copy, Default)]
pub struct TimezoneMiddleware;

impl TimezoneMiddleware {
    pub const SESSION_KEY: &'static str = "user_timezone";
}

#[async_trait]
impl Middleware for TimezoneMiddleware {
    async fn process_request(&self, request: &mut HttpRequest) -> Option<HttpResponse> {
        let timezone = request
            .session()
            .get(Self::SESSION_KEY)
            .filter(|tz| parse_timezone(tz).is_ok())
            .cloned();
        tracing::trace!(timezone = ?timezone, "activating time zone");
        request.set_timezone(timezone);
        None
    }
}
