//! Manager capabilities.
//!
//! Each manager is a trait with default methods, implemented for every
//! [`ModelStore`] whose model has the matching capability. A store of a model
//! that implements [`SlugModel`] and [`TokenModel`] therefore gets slug and
//! token lookups without any manager type of its own.

use std::collections::HashSet;

use async_trait::async_trait;
use django_core_common::error::{CoreError, CoreResult};
use django_core_common::utils::random::{combinations, is_reachable, random_alphanum};
use django_core_common::utils::text::slugify;

use crate::hooks::SavePrep;
use crate::mixins::generic::{ContentType, ContentTypeRegistry, GenericObject};
use crate::mixins::tokens::TokenModel;
use crate::model::Model;
use crate::query::Q;
use crate::store::ModelStore;
use crate::value::Value;

/// Token spaces at most this large are checked for exhaustion up front.
const EXHAUSTION_CHECK_LIMIT: u128 = 1_000_000;
/// Upper bound on candidates generated per round.
const MAX_TOKEN_BUFFER: usize = 10_000;
/// Consecutive rounds without a new token before giving up.
const MAX_STALE_ROUNDS: usize = 1_000;

fn not_found<M: Model>() -> CoreError {
    CoreError::NotFound(format!("No {} matches the given query.", M::model_name()))
}

/// A model with a `slug` field.
pub trait SlugModel: Model {
    /// Name of the slug field.
    fn slug_field_name() -> &'static str {
        "slug"
    }
}

/// A model that belongs to a user.
pub trait UserOwnedModel: Model {
    /// Name of the user foreign key field.
    fn user_field_name() -> &'static str {
        "user_id"
    }
}

// ── BaseManager ────────────────────────────────────────────────────────

/// Lookups that return `None` instead of failing.
#[async_trait]
pub trait BaseManager<M: Model>: ModelStore<M> {
    /// Gets a single object matching `q`, or `None` if there is none.
    ///
    /// `MultipleObjectsReturned` is still an error.
    async fn get_or_none(&self, q: &Q) -> CoreResult<Option<M>> {
        match self.get(q).await {
            Ok(obj) => Ok(Some(obj)),
            Err(CoreError::DoesNotExist(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl<M: Model, S: ModelStore<M> + ?Sized> BaseManager<M> for S {}

// ── CommonManager ──────────────────────────────────────────────────────

/// Id lookups, bulk creation and deletion by id.
#[async_trait]
pub trait CommonManager<M: SavePrep>: BaseManager<M> {
    /// Gets an object by primary key.
    async fn get_by_id(&self, id: i64) -> CoreResult<Option<M>> {
        self.get_or_none(&Q::eq("pk", id)).await
    }

    /// Gets an object by primary key or fails with `NotFound`.
    async fn get_by_id_or_404(&self, id: i64) -> CoreResult<M> {
        self.get_by_id(id).await?.ok_or_else(not_found::<M>)
    }

    /// Gets every object whose primary key is in `ids`.
    async fn get_by_ids(&self, ids: &[i64]) -> CoreResult<Vec<M>> {
        self.filter(&Q::is_in("pk", ids.iter().copied())).await
    }

    /// Runs `save_prep` on all objects, then inserts them at once.
    async fn bulk_create(&self, mut objs: Vec<M>) -> CoreResult<Vec<M>> {
        M::save_prep(self, &mut objs).await?;
        self.bulk_insert(&mut objs).await?;
        Ok(objs)
    }

    /// Deletes an object by primary key; `true` if it existed.
    async fn delete_by_id(&self, id: i64) -> CoreResult<bool> {
        self.delete_by_ids(&[id]).await
    }

    /// Deletes objects by primary key; `true` if any were deleted.
    async fn delete_by_ids(&self, ids: &[i64]) -> CoreResult<bool> {
        let deleted = self.delete(&Q::is_in("pk", ids.iter().copied())).await?;
        Ok(deleted > 0)
    }
}

impl<M: SavePrep, S: ModelStore<M> + ?Sized> CommonManager<M> for S {}

// ── SlugManager ────────────────────────────────────────────────────────

/// Slug lookups and generation of unused slugs.
#[async_trait]
pub trait SlugManager<M: SlugModel>: BaseManager<M> {
    /// Gets an object by slug.
    async fn get_by_slug(&self, slug: &str) -> CoreResult<Option<M>> {
        self.get_or_none(&Q::eq(M::slug_field_name(), slug)).await
    }

    /// Gets an object by slug or fails with `NotFound`.
    async fn get_by_slug_or_404(&self, slug: &str) -> CoreResult<M> {
        self.get_by_slug(slug).await?.ok_or_else(not_found::<M>)
    }

    /// `true` when no object uses `slug`.
    async fn is_slug_available(&self, slug: &str) -> CoreResult<bool> {
        self.is_slug_available_in(slug, Q::all()).await
    }

    /// `true` when no object matching `scope` uses `slug`.
    async fn is_slug_available_in(&self, slug: &str, scope: Q) -> CoreResult<bool> {
        let taken = self
            .exists(&(scope & Q::eq(M::slug_field_name(), slug)))
            .await?;
        Ok(!taken)
    }

    /// Slugifies `value`, then appends `-1`, `-2`, ... until the slug is unused.
    async fn get_next_slug(&self, value: &str) -> CoreResult<String> {
        self.get_next_slug_in(value, Q::all()).await
    }

    /// [`Self::get_next_slug`] where only objects matching `scope` count as taken.
    async fn get_next_slug_in(&self, value: &str, scope: Q) -> CoreResult<String> {
        let original = slugify(value);
        let mut slug = original.clone();
        let mut count = 0_u64;
        while !self.is_slug_available_in(&slug, scope.clone()).await? {
            count += 1;
            slug = format!("{original}-{count}");
        }
        Ok(slug)
    }
}

impl<M: SlugModel, S: ModelStore<M> + ?Sized> SlugManager<M> for S {}

// ── TokenManager ───────────────────────────────────────────────────────

fn token_buffer(count: usize) -> usize {
    count.div_ceil(20).max(5)
}

/// Token lookups and generation of unused tokens.
#[async_trait]
pub trait TokenManager<M: TokenModel>: BaseManager<M> {
    /// Gets an object by token.
    async fn get_by_token(&self, token: &str) -> CoreResult<Option<M>> {
        self.get_or_none(&Q::eq(M::token_field_name(), token)).await
    }

    /// Gets an object by token or fails with `NotFound`.
    async fn get_by_token_or_404(&self, token: &str) -> CoreResult<M> {
        self.get_by_token(token).await?.ok_or_else(not_found::<M>)
    }

    /// Returns one unused token of `length` characters.
    async fn get_next_token(&self, length: usize) -> CoreResult<String> {
        let mut tokens = self.get_available_tokens(1, length).await?;
        tokens.pop().ok_or(CoreError::TokenSpaceExhausted {
            requested: 1,
            available: 0,
        })
    }

    /// Returns `count` distinct tokens of `token_length` characters that no
    /// stored object uses.
    ///
    /// Each round generates `count` plus a buffer of random candidates (5% of
    /// `count`, at least 5), drops those already stored with one bulk lookup,
    /// and keeps the rest. The buffer doubles every round that comes up short.
    ///
    /// Fails with [`CoreError::TokenSpaceExhausted`] when fewer than `count`
    /// tokens of this length are free. Small spaces are counted exactly before
    /// sampling; large ones give up after a long run of rounds that find
    /// nothing new.
    async fn get_available_tokens(
        &self,
        count: usize,
        token_length: usize,
    ) -> CoreResult<Vec<String>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let field = M::token_field_name();

        let space = combinations(token_length);
        if space <= EXHAUSTION_CHECK_LIMIT {
            let taken = self
                .values_list(&Q::all(), field)
                .await?
                .iter()
                .filter(|v| {
                    v.as_str()
                        .is_some_and(|s| s.chars().count() == token_length && is_reachable(s))
                })
                .count();
            let free = space.saturating_sub(taken as u128);
            if free < count as u128 {
                tracing::warn!(count, token_length, free = %free, "token space exhausted");
                return Err(CoreError::TokenSpaceExhausted {
                    requested: count,
                    available: free,
                });
            }
        }

        let mut buffer = token_buffer(count);
        let mut available: Vec<String> = Vec::with_capacity(count);
        let mut seen: HashSet<String> = HashSet::new();
        let mut stale_rounds = 0;
        let mut round = 0_usize;

        loop {
            round += 1;
            let candidates: HashSet<String> = (0..count + buffer)
                .map(|_| random_alphanum(token_length))
                .filter(|t| !seen.contains(t))
                .collect();
            let stored: HashSet<String> = self
                .values_list(&Q::is_in(field, candidates.iter().cloned()), field)
                .await?
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect();

            let before = available.len();
            for candidate in candidates {
                if !stored.contains(&candidate) && seen.insert(candidate.clone()) {
                    available.push(candidate);
                }
            }

            if available.len() >= count {
                available.truncate(count);
                tracing::debug!(count, token_length, round, "generated tokens");
                return Ok(available);
            }

            if available.len() == before {
                stale_rounds += 1;
                if stale_rounds >= MAX_STALE_ROUNDS {
                    tracing::warn!(count, token_length, round, "giving up on token generation");
                    return Err(CoreError::TokenSpaceExhausted {
                        requested: count,
                        available: available.len() as u128,
                    });
                }
            } else {
                stale_rounds = 0;
            }
            tracing::debug!(
                round,
                found = available.len(),
                requested = count,
                "token round came up short"
            );
            buffer = (buffer * 2).min(MAX_TOKEN_BUFFER);
        }
    }
}

impl<M: TokenModel, S: ModelStore<M> + ?Sized> TokenManager<M> for S {}

// ── UserManager ────────────────────────────────────────────────────────

/// Lookups by owning user.
#[async_trait]
pub trait UserManager<M: UserOwnedModel>: ModelStore<M> {
    /// Every object owned by `user`; empty for an unsaved user.
    async fn get_by_user<U: Model>(&self, user: &U) -> CoreResult<Vec<M>> {
        match user.pk() {
            Some(user_id) => self.get_by_user_id(user_id).await,
            None => Ok(Vec::new()),
        }
    }

    /// Every object owned by the user with `user_id`.
    async fn get_by_user_id(&self, user_id: i64) -> CoreResult<Vec<M>> {
        self.filter(&Q::eq(M::user_field_name(), user_id)).await
    }
}

impl<M: UserOwnedModel, S: ModelStore<M> + ?Sized> UserManager<M> for S {}

// ── GenericManager ─────────────────────────────────────────────────────

/// Lookups of generic objects by what they point at.
#[async_trait]
pub trait GenericManager<M: GenericObject + SavePrep>: BaseManager<M> {
    /// Gets the generic object pointing at `content_object`, creating it if needed.
    ///
    /// Returns the object and whether it was created.
    async fn get_or_create_generic<T: Model>(
        &self,
        registry: &ContentTypeRegistry,
        content_object: &T,
    ) -> CoreResult<(M, bool)> {
        let content_type = registry.get_for_model::<T>()?;
        let object_id = content_object.pk().ok_or_else(|| {
            CoreError::DatabaseError(format!(
                "Cannot reference an unsaved {} instance",
                T::model_name()
            ))
        })?;
        let q = Q::eq("content_type_id", content_type.id) & Q::eq("object_id", object_id);
        if let Some(existing) = self.get_or_none(&q).await? {
            return Ok((existing, false));
        }
        let mut obj = M::for_object(content_type.id, object_id);
        crate::hooks::save_model(self, &mut obj).await?;
        Ok((obj, true))
    }

    /// Every generic object of `content_type`.
    async fn get_by_content_type(&self, content_type: &ContentType) -> CoreResult<Vec<M>> {
        self.filter(&Q::eq("content_type_id", content_type.id)).await
    }

    /// Every generic object pointing at a `T`.
    async fn get_by_model<T: Model>(&self, registry: &ContentTypeRegistry) -> CoreResult<Vec<M>> {
        let content_type = registry.get_for_model::<T>()?;
        self.get_by_content_type(content_type).await
    }
}

impl<M: GenericObject + SavePrep, S: ModelStore<M> + ?Sized> GenericManager<M> for S {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_buffer() {
        assert_eq!(token_buffer(1), 5);
        assert_eq!(token_buffer(100), 5);
        assert_eq!(token_buffer(101), 6);
        assert_eq!(token_buffer(1000), 50);
    }
}
