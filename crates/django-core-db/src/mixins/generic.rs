//! Content types and generic (model-agnostic) object references.

use std::fmt;

use django_core_common::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

use crate::model::Model;

/// Identifies a model type by app label and model name.
///
/// ```
/// use django_core_db::mixins::generic::ContentType;
///
/// let ct = ContentType::new(1, "blog", "article");
/// assert_eq!(ct.model_class(), "blog.article");
/// assert_eq!(ct.to_string(), "blog | article");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentType {
    /// Registry-assigned id, stored on generic objects.
    pub id: i64,
    /// The application label (e.g. "blog", "auth").
    pub app_label: String,
    /// The model name in lowercase (e.g. "article", "user").
    pub model: String,
}

impl ContentType {
    /// Creates a content type.
    pub fn new(id: i64, app_label: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            id,
            app_label: app_label.into(),
            model: model.into(),
        }
    }

    /// Returns the model class identifier in `"app_label.model"` format.
    pub fn model_class(&self) -> String {
        format!("{}.{}", self.app_label, self.model)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {}", self.app_label, self.model)
    }
}

/// The set of models that generic objects may point at.
///
/// Models must be registered before they can be referenced.
#[derive(Debug, Clone, Default)]
pub struct ContentTypeRegistry {
    types: Vec<ContentType>,
}

impl ContentTypeRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `M` (once) and returns its content type.
    pub fn register<M: Model>(&mut self) -> ContentType {
        if let Some(ct) = self.get(M::app_label(), M::model_name()) {
            return ct.clone();
        }
        let id = i64::try_from(self.types.len()).unwrap_or(i64::MAX - 1) + 1;
        let ct = ContentType::new(id, M::app_label(), M::model_name());
        self.types.push(ct.clone());
        ct
    }

    /// Looks up a content type by app label and model name.
    pub fn get(&self, app_label: &str, model: &str) -> Option<&ContentType> {
        self.types
            .iter()
            .find(|ct| ct.app_label == app_label && ct.model == model)
    }

    /// Looks up a content type by id.
    pub fn get_for_id(&self, id: i64) -> Option<&ContentType> {
        self.types.iter().find(|ct| ct.id == id)
    }

    /// Returns the content type of `M`.
    ///
    /// Fails with `ImproperlyConfigured` when `M` was never registered.
    pub fn get_for_model<M: Model>(&self) -> CoreResult<&ContentType> {
        self.get(M::app_label(), M::model_name()).ok_or_else(|| {
            CoreError::ImproperlyConfigured(format!(
                "Model '{}.{}' is not registered as a content type",
                M::app_label(),
                M::model_name()
            ))
        })
    }

    /// Returns all registered content types.
    pub fn all(&self) -> &[ContentType] {
        &self.types
    }
}

/// A model that points at an arbitrary object through a content type.
pub trait GenericObject: Model {
    /// Builds an unsaved instance pointing at `object_id` of `content_type_id`.
    fn for_object(content_type_id: i64, object_id: i64) -> Self;

    /// The referenced object's content type id.
    fn content_type_id(&self) -> i64;

    /// The referenced object's primary key.
    fn object_id(&self) -> i64;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_equality() {
        let ct1 = ContentType::new(1, "blog", "article");
        let ct2 = ContentType::new(1, "blog", "article");
        let ct3 = ContentType::new(2, "blog", "comment");
        assert_eq!(ct1, ct2);
        assert_ne!(ct1, ct3);
    }

    #[test]
    fn test_content_type_serialization() {
        let ct = ContentType::new(3, "blog", "article");
        let json = serde_json::to_string(&ct).unwrap();
        assert!(json.contains("\"app_label\":\"blog\""));
        assert!(json.contains("\"id\":3"));
    }

    #[test]
    fn test_registry_lookup_misses() {
        let registry = ContentTypeRegistry::new();
        assert!(registry.get("blog", "article").is_none());
        assert!(registry.get_for_id(1).is_none());
        assert!(registry.all().is_empty());
    }
}
