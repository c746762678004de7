//! Persistence seam: the [`ModelStore`] trait and an in-memory implementation.
//!
//! Managers and mixins are written against `ModelStore<M>`, so an application
//! can back them with whatever database layer it uses. [`InMemoryStore`] keeps
//! rows in a `tokio::sync::RwLock` and is what the test-suites use.

use async_trait::async_trait;
use django_core_common::error::{CoreError, CoreResult};
use tokio::sync::RwLock;

use crate::model::Model;
use crate::query::Q;
use crate::value::Value;

/// Async storage operations for a single model type.
///
/// Only the five primitive operations are required; the rest have default
/// implementations built on top of them.
#[async_trait]
pub trait ModelStore<M: Model>: Send + Sync {
    /// Returns every object matching `q`, ordered by primary key.
    async fn filter(&self, q: &Q) -> CoreResult<Vec<M>>;

    /// Inserts `obj`, assigning its primary key if unset.
    async fn insert(&self, obj: &mut M) -> CoreResult<()>;

    /// Replaces the stored row that has `obj`'s primary key.
    ///
    /// Fails with `DoesNotExist` when there is no such row.
    async fn update(&self, obj: &M) -> CoreResult<()>;

    /// Deletes every object matching `q` and returns how many were removed.
    async fn delete(&self, q: &Q) -> CoreResult<usize>;

    /// Sets `values` on every object matching `q`; returns the number updated.
    async fn update_where(&self, q: &Q, values: &[(&str, Value)]) -> CoreResult<usize>;

    /// Returns every object.
    async fn all(&self) -> CoreResult<Vec<M>> {
        self.filter(&Q::all()).await
    }

    /// Returns the single object matching `q`.
    ///
    /// Fails with `DoesNotExist` or `MultipleObjectsReturned`.
    async fn get(&self, q: &Q) -> CoreResult<M> {
        let mut found = self.filter(q).await?;
        match found.len() {
            0 => Err(CoreError::DoesNotExist(format!(
                "{} matching query does not exist.",
                M::model_name()
            ))),
            1 => Ok(found.remove(0)),
            n => Err(CoreError::MultipleObjectsReturned(format!(
                "get() returned more than one {} -- it returned {n}!",
                M::model_name()
            ))),
        }
    }

    /// Counts the objects matching `q`.
    async fn count(&self, q: &Q) -> CoreResult<usize> {
        Ok(self.filter(q).await?.len())
    }

    /// Returns `true` if any object matches `q`.
    async fn exists(&self, q: &Q) -> CoreResult<bool> {
        Ok(self.count(q).await? > 0)
    }

    /// Returns the value of `field` for every object matching `q`.
    async fn values_list(&self, q: &Q, field: &str) -> CoreResult<Vec<Value>> {
        Ok(self
            .filter(q)
            .await?
            .iter()
            .map(|obj| obj.lookup_value(field))
            .collect())
    }

    /// Inserts several objects.
    async fn bulk_insert(&self, objs: &mut [M]) -> CoreResult<()> {
        for obj in objs.iter_mut() {
            self.insert(obj).await?;
        }
        Ok(())
    }

    /// Updates the object if it has a stored primary key, inserts it otherwise.
    async fn save(&self, obj: &mut M) -> CoreResult<()> {
        if obj.pk().is_some() {
            match self.update(obj).await {
                Err(CoreError::DoesNotExist(_)) => {}
                other => return other,
            }
        }
        self.insert(obj).await
    }
}

#[derive(Debug)]
struct Table<M> {
    rows: Vec<M>,
    next_id: i64,
}

/// A [`ModelStore`] that keeps rows in memory.
///
/// Primary keys auto-increment from 1. Unique fields declared by
/// [`Model::unique_field_names`] are enforced on insert and update; null
/// values never collide.
///
/// ```
/// use django_core_db::store::{InMemoryStore, ModelStore};
/// # use django_core_db::model::{unknown_field, Model};
/// # use django_core_db::value::{FromValue, Value};
/// # use django_core_common::CoreResult;
/// # #[derive(Clone)]
/// # struct Tag { id: Option<i64>, name: String }
/// # impl Model for Tag {
/// #     fn table_name() -> &'static str { "tag" }
/// #     fn app_label() -> &'static str { "demo" }
/// #     fn model_name() -> &'static str { "tag" }
/// #     fn field_names() -> &'static [&'static str] { &["id", "name"] }
/// #     fn pk(&self) -> Option<i64> { self.id }
/// #     fn set_pk(&mut self, pk: Option<i64>) { self.id = pk; }
/// #     fn field_value(&self, name: &str) -> Option<Value> {
/// #         match name { "id" => Some(self.id.into()), "name" => Some(self.name.clone().into()), _ => None }
/// #     }
/// #     fn set_field_value(&mut self, name: &str, value: Value) -> CoreResult<()> {
/// #         match name {
/// #             "id" => self.id = FromValue::from_value(value)?,
/// #             "name" => self.name = FromValue::from_value(value)?,
/// #             _ => return Err(unknown_field::<Self>(name)),
/// #         }
/// #         Ok(())
/// #     }
/// # }
/// # tokio_test::block_on(async {
/// let store = InMemoryStore::<Tag>::new();
/// let mut tag = Tag { id: None, name: "rust".into() };
/// store.insert(&mut tag).await.unwrap();
/// assert_eq!(tag.id, Some(1));
/// # });
/// ```
#[derive(Debug)]
pub struct InMemoryStore<M> {
    table: RwLock<Table<M>>,
}

impl<M: Model> Default for InMemoryStore<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Model> InMemoryStore<M> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Table {
                rows: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// Returns the number of stored rows.
    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    /// Returns `true` when the store holds no rows.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn check_unique(rows: &[M], obj: &M) -> CoreResult<()> {
        for field in M::unique_field_names() {
            let value = obj.lookup_value(field);
            if value.is_null() {
                continue;
            }
            let clash = rows
                .iter()
                .any(|row| row.pk() != obj.pk() && row.lookup_value(field) == value);
            if clash {
                return Err(CoreError::IntegrityError(format!(
                    "UNIQUE constraint failed: {}.{field}",
                    M::table_name()
                )));
            }
        }
        Ok(())
    }

    fn insert_row(table: &mut Table<M>, obj: &mut M) -> CoreResult<()> {
        if let Some(pk) = obj.pk() {
            if table.rows.iter().any(|row| row.pk() == Some(pk)) {
                return Err(CoreError::IntegrityError(format!(
                    "UNIQUE constraint failed: {}.{}",
                    M::table_name(),
                    M::pk_field_name()
                )));
            }
        }
        Self::check_unique(&table.rows, obj)?;
        match obj.pk() {
            Some(pk) => table.next_id = table.next_id.max(pk + 1),
            None => {
                obj.set_pk(Some(table.next_id));
                table.next_id += 1;
            }
        }
        table.rows.push(obj.clone());
        Ok(())
    }
}

#[async_trait]
impl<M: Model> ModelStore<M> for InMemoryStore<M> {
    async fn filter(&self, q: &Q) -> CoreResult<Vec<M>> {
        let table = self.table.read().await;
        let mut found: Vec<M> = table.rows.iter().filter(|row| q.matches(*row)).cloned().collect();
        found.sort_by_key(|obj| obj.pk());
        Ok(found)
    }

    async fn insert(&self, obj: &mut M) -> CoreResult<()> {
        let mut table = self.table.write().await;
        Self::insert_row(&mut table, obj)?;
        tracing::trace!(table = M::table_name(), pk = ?obj.pk(), "inserted row");
        Ok(())
    }

    async fn update(&self, obj: &M) -> CoreResult<()> {
        let mut table = self.table.write().await;
        let Some(pk) = obj.pk() else {
            return Err(CoreError::DatabaseError(
                "Cannot update a model without a primary key".to_string(),
            ));
        };
        Self::check_unique(&table.rows, obj)?;
        let row = table
            .rows
            .iter_mut()
            .find(|row| row.pk() == Some(pk))
            .ok_or_else(|| {
                CoreError::DoesNotExist(format!("{} with pk {pk} does not exist.", M::model_name()))
            })?;
        *row = obj.clone();
        Ok(())
    }

    async fn delete(&self, q: &Q) -> CoreResult<usize> {
        let mut table = self.table.write().await;
        let before = table.rows.len();
        table.rows.retain(|row| !q.matches(row));
        let deleted = before - table.rows.len();
        tracing::debug!(table = M::table_name(), deleted, "deleted rows");
        Ok(deleted)
    }

    async fn update_where(&self, q: &Q, values: &[(&str, Value)]) -> CoreResult<usize> {
        let mut table = self.table.write().await;
        let mut updated: Vec<M> = Vec::new();
        for row in table.rows.iter().filter(|row| q.matches(*row)) {
            let mut row = row.clone();
            for (field, value) in values {
                row.set_field_value(field, value.clone())?;
            }
            updated.push(row);
        }
        for row in &updated {
            Self::check_unique(&table.rows, row)?;
        }
        let count = updated.len();
        for new_row in updated {
            if let Some(slot) = table.rows.iter_mut().find(|r| r.pk() == new_row.pk()) {
                *slot = new_row;
            }
        }
        tracing::debug!(table = M::table_name(), updated = count, "updated rows");
        Ok(count)
    }

    async fn bulk_insert(&self, objs: &mut [M]) -> CoreResult<()> {
        let mut table = self.table.write().await;
        let snapshot_next_id = table.next_id;
        let snapshot_len = table.rows.len();
        let originally_unset: Vec<bool> = objs.iter().map(|o| o.pk().is_none()).collect();
        let result = objs
            .iter_mut()
            .try_for_each(|obj| Self::insert_row(&mut table, obj));
        if let Err(e) = result {
            table.rows.truncate(snapshot_len);
            table.next_id = snapshot_next_id;
            for (obj, unset) in objs.iter_mut().zip(&originally_unset) {
                if *unset {
                    obj.set_pk(None);
                }
            }
            return Err(e);
        }
        tracing::debug!(table = M::table_name(), inserted = objs.len(), "bulk inserted rows");
        Ok(())
    }
}
