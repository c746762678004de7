//! Single object views and the per-request object cache.

use std::future::Future;

use async_trait::async_trait;
use django_core_common::error::{CoreError, CoreResult};
use django_core_http::{HttpRequest, HttpResponse};

use crate::view::View;

/// A view about one object, loaded from the request.
#[async_trait]
pub trait ObjectView: Send + Sync {
    type Object: Send + Sync + 'static;

    /// Loads the object the request refers to; `None` when there is none.
    async fn get_object(&self, request: &HttpRequest) -> CoreResult<Option<Self::Object>>;

    /// Handles the request once its object is loaded.
    async fn dispatch_object(&self, request: HttpRequest, object: Self::Object) -> HttpResponse;
}

/// Holds the object of a request once it has been loaded, so checks that
/// run before the view (ownership, permissions) don't load it again.
///
/// ```
/// # tokio_test::block_on(async {
/// use django_core_views::mixins::CommonSingleObjectViewMixin;
///
/// let mut cache = CommonSingleObjectViewMixin::new();
/// let first = cache.get_object(|| async { Ok(Some(1)) }).await.unwrap().copied();
/// let second = cache.get_object(|| async { Ok(Some(2)) }).await.unwrap().copied();
/// assert_eq!((first, second), (Some(1), Some(1)));
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct CommonSingleObjectViewMixin<M> {
    object: Option<M>,
}

impl<M> Default for CommonSingleObjectViewMixin<M> {
    fn default() -> Self {
        Self { object: None }
    }
}

impl<M> CommonSingleObjectViewMixin<M> {
    pub const fn new() -> Self {
        Self { object: None }
    }

    pub const fn with_object(object: M) -> Self {
        Self {
            object: Some(object),
        }
    }

    pub const fn object(&self) -> Option<&M> {
        self.object.as_ref()
    }

    pub fn set_object(&mut self, object: M) {
        self.object = Some(object);
    }

    pub fn into_object(self) -> Option<M> {
        self.object
    }

    /// Returns the cached object, loading it with `load` the first time.
    pub async fn get_object<F, Fut>(&mut self, load: F) -> CoreResult<Option<&M>>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = CoreResult<Option<M>>> + Send,
    {
        if self.object.is_none() {
            self.object = load().await?;
        }
        Ok(self.object.as_ref())
    }
}

/// Serves an [`ObjectView`]: 404 when the object doesn't exist.
pub struct SingleObject<V> {
    view: V,
}

impl<V: ObjectView> SingleObject<V> {
    pub const fn new(view: V) -> Self {
        Self { view }
    }

    pub const fn inner(&self) -> &V {
        &self.view
    }
}

#[async_trait]
impl<V: ObjectView> View for SingleObject<V> {
    async fn dispatch(&self, request: HttpRequest) -> HttpResponse {
        match load_object(&self.view, &request).await {
            Ok(object) => self.view.dispatch_object(request, object).await,
            Err(e) => e.into(),
        }
    }
}

/// Loads the object of `request`; `NotFound` when there is none.
pub(crate) async fn load_object<V: ObjectView + ?Sized>(
    view: &V,
    request: &HttpRequest,
) -> CoreResult<V::Object> {
    let mut cache = CommonSingleObjectViewMixin::new();
    cache.get_object(|| view.get_object(request)).await?;
    cache
        .into_object()
        .ok_or_else(|| CoreError::NotFound(format!("No object found for {}", request.path())))
}
