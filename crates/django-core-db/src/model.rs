//! The [`Model`] trait.
//!
//! Every persisted type implements `Model`, exposing its fields by name as
//! [`Value`]s. Managers, mixins and the query evaluator only ever talk to a
//! model through this trait, so the same helpers work for any struct.

use django_core_common::error::{CoreError, CoreResult};

use crate::value::Value;

/// The core trait for all models.
///
/// # Examples
///
/// ```
/// use django_core_db::model::{unknown_field, Model};
/// use django_core_db::value::{FromValue, Value};
/// use django_core_common::CoreResult;
///
/// #[derive(Clone)]
/// struct Article {
///     id: Option<i64>,
///     title: String,
/// }
///
/// impl Model for Article {
///     fn table_name() -> &'static str { "blog_article" }
///     fn app_label() -> &'static str { "blog" }
///     fn model_name() -> &'static str { "article" }
///     fn field_names() -> &'static [&'static str] { &["id", "title"] }
///
///     fn pk(&self) -> Option<i64> { self.id }
///     fn set_pk(&mut self, pk: Option<i64>) { self.id = pk; }
///
///     fn field_value(&self, name: &str) -> Option<Value> {
///         match name {
///             "id" => Some(self.id.into()),
///             "title" => Some(self.title.clone().into()),
///             _ => None,
///         }
///     }
///
///     fn set_field_value(&mut self, name: &str, value: Value) -> CoreResult<()> {
///         match name {
///             "id" => self.id = FromValue::from_value(value)?,
///             "title" => self.title = FromValue::from_value(value)?,
///             _ => return Err(unknown_field::<Self>(name)),
///         }
///         Ok(())
///     }
/// }
///
/// let article = Article { id: Some(3), title: "Hi".into() };
/// assert_eq!(article.lookup_value("pk"), Value::Int(3));
/// ```
pub trait Model: Clone + Send + Sync + 'static {
    /// Returns the table name.
    fn table_name() -> &'static str;

    /// Returns the application label this model belongs to.
    fn app_label() -> &'static str;

    /// Returns the lowercase model name (used for content types).
    fn model_name() -> &'static str;

    /// Returns the human readable model name.
    fn verbose_name() -> String {
        Self::model_name().replace('_', " ")
    }

    /// Returns the name of the primary key field.
    fn pk_field_name() -> &'static str {
        "id"
    }

    /// Returns the names of every field, primary key included.
    fn field_names() -> &'static [&'static str];

    /// Fields whose string values are trimmed before saving.
    fn char_field_names() -> &'static [&'static str] {
        &[]
    }

    /// Fields that must be unique across the table (the primary key is implied).
    fn unique_field_names() -> &'static [&'static str] {
        &[]
    }

    /// The default value of a field, used when a copy resets it.
    fn field_default(_name: &str) -> Value {
        Value::Null
    }

    /// Returns the primary key, or `None` if unsaved.
    fn pk(&self) -> Option<i64>;

    /// Sets (or clears) the primary key.
    fn set_pk(&mut self, pk: Option<i64>);

    /// Returns the value of a named field, `None` if the model has no such field.
    fn field_value(&self, name: &str) -> Option<Value>;

    /// Sets a named field from a [`Value`].
    fn set_field_value(&mut self, name: &str, value: Value) -> CoreResult<()>;

    /// Returns all field name-value pairs for this instance.
    fn field_values(&self) -> Vec<(&'static str, Value)> {
        Self::field_names()
            .iter()
            .map(|name| (*name, self.field_value(name).unwrap_or(Value::Null)))
            .collect()
    }

    /// Resolves a field name for queries. `"pk"` is an alias of the primary key
    /// and unknown fields read as null.
    fn lookup_value(&self, name: &str) -> Value {
        if name == "pk" || name == Self::pk_field_name() {
            return self.pk().into();
        }
        self.field_value(name).unwrap_or(Value::Null)
    }

    /// Trims whitespace from every char field.
    fn strip_fields(&mut self) -> CoreResult<()> {
        for name in Self::char_field_names() {
            if let Some(Value::String(s)) = self.field_value(name) {
                let trimmed = s.trim();
                if trimmed.len() != s.len() {
                    self.set_field_value(name, Value::String(trimmed.to_string()))?;
                }
            }
        }
        Ok(())
    }
}

/// The error returned by `set_field_value` for a field the model does not have.
pub fn unknown_field<M: Model>(name: &str) -> CoreError {
    CoreError::DatabaseError(format!(
        "Cannot resolve keyword '{name}' into field of {}",
        M::table_name()
    ))
}
