//! Pre-save hooks.
//!
//! [`SavePrep`] is the model-local hook run before objects are written, both
//! for a single [`save_model`] and for `bulk_create`. A model composes the
//! mixin helpers it needs inside its own `save_prep`, for example
//! [`assign_tokens`](crate::mixins::tokens::assign_tokens) followed by
//! [`AbstractBaseModel::audit_save_prep`](crate::mixins::base::AbstractBaseModel::audit_save_prep).

use async_trait::async_trait;
use django_core_common::error::CoreResult;

use crate::model::Model;
use crate::store::ModelStore;

/// Processing applied to one or many instances right before they are saved.
///
/// The default implementation does nothing. Returning `Err` aborts the save.
#[async_trait]
pub trait SavePrep: Model {
    /// Prepares `instances` for saving. `store` is where they will be written.
    async fn save_prep<S>(store: &S, instances: &mut [Self]) -> CoreResult<()>
    where
        S: ModelStore<Self> + ?Sized,
    {
        let _ = (store, instances);
        Ok(())
    }
}

/// Runs [`SavePrep::save_prep`] on `obj`, then inserts or updates it.
pub async fn save_model<M, S>(store: &S, obj: &mut M) -> CoreResult<()>
where
    M: SavePrep,
    S: ModelStore<M> + ?Sized,
{
    M::save_prep(store, std::slice::from_mut(obj)).await?;
    store.save(obj).await
}
