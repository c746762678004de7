//! Soft delete and read-only models.

use std::ops::Deref;

use async_trait::async_trait;
use django_core_common::error::{CoreError, CoreResult};

use crate::hooks::{save_model, SavePrep};
use crate::model::Model;
use crate::query::Q;
use crate::store::ModelStore;
use crate::value::Value;

/// A model that is flagged as deleted instead of being removed.
#[async_trait]
pub trait SafeDeleteModel: SavePrep {
    /// Name of the boolean flag field.
    fn is_deleted_field_name() -> &'static str {
        "is_deleted"
    }

    /// Whether this object is flagged as deleted.
    fn is_deleted(&self) -> bool;

    /// Sets the deleted flag.
    fn set_deleted(&mut self, is_deleted: bool);

    /// Flags this object as deleted and saves it.
    async fn delete_safe<S>(&mut self, store: &S) -> CoreResult<()>
    where
        S: ModelStore<Self> + ?Sized,
    {
        self.set_deleted(true);
        save_model(store, self).await
    }
}

/// Adds the `is_deleted` condition to `q`, unless `is_deleted` is `None` or
/// `q` targets the primary key.
///
/// Lookups by primary key always see deleted objects.
pub fn with_deleted_filter<M: SafeDeleteModel>(is_deleted: Option<bool>, q: Q) -> Q {
    match is_deleted {
        Some(flag) if !q.references_field("pk") && !q.references_field(M::pk_field_name()) => {
            q & Q::eq(M::is_deleted_field_name(), flag)
        }
        _ => q,
    }
}

/// Query operations aware of the soft delete flag.
///
/// Implemented for every store of a [`SafeDeleteModel`].
#[async_trait]
pub trait SafeDeleteQuerySet<M: SafeDeleteModel>: ModelStore<M> {
    /// Filters with the deleted flag.
    ///
    /// `Some(true)` returns only deleted objects, `Some(false)` only live
    /// ones and `None` all of them.
    async fn filter_safe(&self, is_deleted: Option<bool>, q: Q) -> CoreResult<Vec<M>> {
        self.filter(&with_deleted_filter::<M>(is_deleted, q)).await
    }

    /// Like [`ModelStore::get`], honoring the deleted flag.
    async fn get_safe(&self, is_deleted: Option<bool>, q: Q) -> CoreResult<M> {
        self.get(&with_deleted_filter::<M>(is_deleted, q)).await
    }

    /// Flags every object matching `q` as deleted; returns how many were flagged.
    async fn delete_safe(&self, q: &Q) -> CoreResult<usize> {
        self.update_where(q, &[(M::is_deleted_field_name(), Value::Bool(true))])
            .await
    }
}

impl<M: SafeDeleteModel, S: ModelStore<M> + ?Sized> SafeDeleteQuerySet<M> for S {}

/// A read-only view of a model.
///
/// Behaves like the wrapped model for reads and queries, but saving it fails
/// with [`CoreError::NotAllowed`].
#[derive(Debug, Clone, PartialEq)]
pub struct ReadOnly<M>(M);

impl<M: Model> ReadOnly<M> {
    /// Wraps a model instance.
    pub const fn new(inner: M) -> Self {
        Self(inner)
    }

    /// Returns the wrapped instance.
    pub fn into_inner(self) -> M {
        self.0
    }
}

impl<M> Deref for ReadOnly<M> {
    type Target = M;

    fn deref(&self) -> &M {
        &self.0
    }
}

impl<M: Model> Model for ReadOnly<M> {
    fn table_name() -> &'static str {
        M::table_name()
    }
    fn app_label() -> &'static str {
        M::app_label()
    }
    fn model_name() -> &'static str {
        M::model_name()
    }
    fn pk_field_name() -> &'static str {
        M::pk_field_name()
    }
    fn field_names() -> &'static [&'static str] {
        M::field_names()
    }
    fn char_field_names() -> &'static [&'static str] {
        M::char_field_names()
    }
    fn unique_field_names() -> &'static [&'static str] {
        M::unique_field_names()
    }
    fn field_default(name: &str) -> Value {
        M::field_default(name)
    }
    fn pk(&self) -> Option<i64> {
        self.0.pk()
    }
    fn set_pk(&mut self, pk: Option<i64>) {
        self.0.set_pk(pk);
    }
    fn field_value(&self, name: &str) -> Option<Value> {
        self.0.field_value(name)
    }
    fn set_field_value(&mut self, name: &str, value: Value) -> CoreResult<()> {
        self.0.set_field_value(name, value)
    }
}

#[async_trait]
impl<M: Model> SavePrep for ReadOnly<M> {
    async fn save_prep<S>(_store: &S, _instances: &mut [Self]) -> CoreResult<()>
    where
        S: ModelStore<Self> + ?Sized,
    {
        Err(CoreError::NotAllowed(
            "Read only models don't allow calling the save method.".to_string(),
        ))
    }
}
