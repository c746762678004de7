use async_trait::async_trait;
use django_core_http::{HttpRequest, HttpResponse};

use crate::view::View;

/// Marks a view as exempt from CSRF checks.
pub struct CsrfExempt<V> {
    view: V,
}

impl<V: View> CsrfExempt<V> {
    pub const fn new(view: V) -> Self {
        Self { view }
    }
}

#[async_trait]
impl<V: View> View for CsrfExempt<V> {
    fn allowed_methods(&self) -> Vec<http::Method> {
        self.view.allowed_methods()
    }

    fn csrf_exempt(&self) -> bool {
        true
    }

    async fn dispatch(&self, request: HttpRequest) -> HttpResponse {
        self.view.dispatch(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Hook;

    #[async_trait]
    impl View for Hook {
        async fn post(&self, _request: HttpRequest) -> HttpResponse {
            HttpResponse::ok("hooked")
        }
    }

    #[tokio::test]
    async fn test_csrf_exempt_delegates() {
        assert!(!Hook.csrf_exempt());
        let view = CsrfExempt::new(Hook);
        assert!(view.csrf_exempt());
        let request = HttpRequest::builder().method(http::Method::POST).build();
        assert_eq!(view.dispatch(request).await.text(), "hooked");
    }
}
