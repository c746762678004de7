//! Ajax aware rendering.

use async_trait::async_trait;
use django_core_common::error::CoreError;
use django_core_http::{HttpRequest, HttpResponse};

use crate::view::{render_template, Context, View};

/// Picks an alternate template for ajax requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AjaxViewMixin {
    pub template_name: String,
    /// Used instead of `template_name` for ajax requests, when set.
    pub ajax_template_name: Option<String>,
}

impl AjaxViewMixin {
    pub fn new(template_name: impl Into<String>) -> Self {
        Self {
            template_name: template_name.into(),
            ajax_template_name: None,
        }
    }

    #[must_use]
    pub fn ajax_template(mut self, ajax_template_name: impl Into<String>) -> Self {
        self.ajax_template_name = Some(ajax_template_name.into());
        self
    }

    /// The template to render for `request`.
    pub fn template_for(&self, request: &HttpRequest) -> &str {
        match &self.ajax_template_name {
            Some(ajax) if request.is_ajax() => ajax,
            _ => &self.template_name,
        }
    }

    pub fn render_to_response(
        &self,
        engine: &tera::Tera,
        request: &HttpRequest,
        context: &Context,
    ) -> HttpResponse {
        render_template(engine, self.template_for(request), context)
    }
}

/// Answers 404 to requests that weren't made with ajax.
pub struct RequiresAjax<V> {
    view: V,
}

impl<V: View> RequiresAjax<V> {
    pub const fn new(view: V) -> Self {
        Self { view }
    }
}

#[async_trait]
impl<V: View> View for RequiresAjax<V> {
    fn allowed_methods(&self) -> Vec<http::Method> {
        self.view.allowed_methods()
    }

    fn csrf_exempt(&self) -> bool {
        self.view.csrf_exempt()
    }

    async fn dispatch(&self, request: HttpRequest) -> HttpResponse {
        if !request.is_ajax() {
            return CoreError::NotFound(format!("{} requires ajax", request.path())).into();
        }
        self.view.dispatch(request).await
    }
}
