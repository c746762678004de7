//! Views about an arbitrary object named by content type and id in the URL.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use django_core_common::error::{CoreError, CoreResult};
use django_core_db::mixins::{ContentType, ContentTypeRegistry, UrlLink};
use django_core_db::{Model, ModelStore, Q};
use django_core_http::HttpRequest;

use crate::view::Context;

/// A loaded object of any registered model, as JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentObject {
    pub content_type: ContentType,
    pub object_id: i64,
    pub fields: serde_json::Map<String, serde_json::Value>,
    pub absolute_url: Option<String>,
}

/// Loads objects of one model by primary key.
#[async_trait]
pub trait ContentObjectLoader: Send + Sync {
    async fn load(
        &self,
        content_type: &ContentType,
        object_id: i64,
    ) -> CoreResult<Option<ContentObject>>;
}

/// Loads `M`s from a store.
pub struct StoreLoader<M, S: ?Sized> {
    store: Arc<S>,
    url: Option<fn(&M) -> String>,
    model: PhantomData<fn() -> M>,
}

impl<M: Model, S: ModelStore<M> + ?Sized> StoreLoader<M, S> {
    pub const fn new(store: Arc<S>) -> Self {
        Self {
            store,
            url: None,
            model: PhantomData,
        }
    }
}

impl<M: UrlLink, S: ModelStore<M> + ?Sized> StoreLoader<M, S> {
    /// A loader that also reports each object's absolute URL.
    pub fn with_urls(store: Arc<S>) -> Self {
        Self {
            store,
            url: Some(|obj: &M| obj.get_absolute_url()),
            model: PhantomData,
        }
    }
}

#[async_trait]
impl<M, S> ContentObjectLoader for StoreLoader<M, S>
where
    M: Model,
    S: ModelStore<M> + ?Sized,
{
    async fn load(
        &self,
        content_type: &ContentType,
        object_id: i64,
    ) -> CoreResult<Option<ContentObject>> {
        let mut found = self.store.filter(&Q::eq("pk", object_id)).await?;
        let Some(obj) = found.pop() else {
            return Ok(None);
        };
        Ok(Some(ContentObject {
            content_type: content_type.clone(),
            object_id,
            fields: obj
                .field_values()
                .into_iter()
                .map(|(name, value)| (name.to_string(), value.to_json()))
                .collect(),
            absolute_url: self.url.map(|url| url(&obj)),
        }))
    }
}

/// Resolves the `content_type_id` and `object_id` URL kwargs to an object.
///
/// Any failure along the way (missing or malformed kwargs, unknown content
/// type, no loader for it, no such object) is a 404.
#[derive(Clone)]
pub struct GenericObjectViewMixin {
    registry: Arc<ContentTypeRegistry>,
    loaders: HashMap<i64, Arc<dyn ContentObjectLoader>>,
}

impl GenericObjectViewMixin {
    pub const CONTENT_TYPE_KWARG: &'static str = "content_type_id";
    pub const OBJECT_ID_KWARG: &'static str = "object_id";

    pub fn new(registry: Arc<ContentTypeRegistry>) -> Self {
        Self {
            registry,
            loaders: HashMap::new(),
        }
    }

    /// Loads objects of `M` with `loader`. `M` must be registered.
    pub fn register<M: Model>(
        &mut self,
        loader: impl ContentObjectLoader + 'static,
    ) -> CoreResult<()> {
        let content_type = self.registry.get_for_model::<M>()?;
        self.loaders.insert(content_type.id, Arc::new(loader));
        Ok(())
    }

    pub async fn get_content_object(&self, request: &HttpRequest) -> CoreResult<ContentObject> {
        let content_type_id = int_kwarg(request, Self::CONTENT_TYPE_KWARG)?;
        let object_id = int_kwarg(request, Self::OBJECT_ID_KWARG)?;
        let content_type = self
            .registry
            .get_for_id(content_type_id)
            .ok_or_else(|| CoreError::NotFound(format!("No content type {content_type_id}")))?;
        let loader = self.loaders.get(&content_type.id).ok_or_else(|| {
            CoreError::NotFound(format!("No objects are served for {content_type}"))
        })?;
        match loader.load(content_type, object_id).await {
            Ok(Some(obj)) => Ok(obj),
            Ok(None) => Err(CoreError::NotFound(format!(
                "No {content_type} with id {object_id}"
            ))),
            Err(e) => {
                tracing::warn!(error = %e, %content_type, object_id, "content object lookup failed");
                Err(CoreError::NotFound(format!(
                    "No {content_type} with id {object_id}"
                )))
            }
        }
    }

    /// Adds `generic_object_content_type`, `content_object` and, when the
    /// object has one, `content_object_url`.
    pub fn add_to_context(&self, object: &ContentObject, context: &mut Context) {
        context.insert(
            "generic_object_content_type".into(),
            serde_json::to_value(&object.content_type).unwrap_or_default(),
        );
        context.insert(
            "content_object".into(),
            serde_json::Value::Object(object.fields.clone()),
        );
        if let Some(url) = &object.absolute_url {
            context.insert("content_object_url".into(), url.clone().into());
        }
    }
}

fn int_kwarg(request: &HttpRequest, name: &str) -> CoreResult<i64> {
    request
        .kwarg(name)
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| CoreError::NotFound(format!("Missing or invalid '{name}'")))
}
