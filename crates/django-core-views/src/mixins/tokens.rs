//! Views reachable only with a valid authorization token in the URL.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use django_core_common::error::{CoreError, CoreResult};
use django_core_db::mixins::Expires;
use django_core_db::{AuthorizationPolicy, DefaultAuthorization, ModelStore, Q, TokenAuthorization};
use django_core_http::{redirect, HttpRequest, HttpResponse};

use crate::view::Context;

/// A view served once the request's authorization token checked out.
#[async_trait]
pub trait AuthorizedView<P: AuthorizationPolicy = DefaultAuthorization>: Send + Sync {
    async fn dispatch_authorized(
        &self,
        request: HttpRequest,
        authorization: TokenAuthorization<P>,
    ) -> HttpResponse;
}

/// Requires the URL to carry the token of an existing authorization.
///
/// Unknown tokens get a 404 and expired ones a redirect to the expired URL.
/// For logged in users only authorizations they created are considered.
pub struct AuthorizationTokenRequiredViewMixin<V, S: ?Sized, P = DefaultAuthorization> {
    view: V,
    store: Arc<S>,
    token_url_kwarg: String,
    expired_url: String,
    policy: PhantomData<fn() -> P>,
}

impl<V, S, P> AuthorizationTokenRequiredViewMixin<V, S, P>
where
    V: AuthorizedView<P>,
    S: ModelStore<TokenAuthorization<P>> + ?Sized,
    P: AuthorizationPolicy,
{
    pub const DEFAULT_TOKEN_URL_KWARG: &'static str = "authorization_token";

    pub fn new(view: V, store: Arc<S>, expired_url: impl Into<String>) -> Self {
        Self {
            view,
            store,
            token_url_kwarg: Self::DEFAULT_TOKEN_URL_KWARG.to_string(),
            expired_url: expired_url.into(),
            policy: PhantomData,
        }
    }

    /// The URL kwarg holding the token.
    #[must_use]
    pub fn token_url_kwarg(mut self, kwarg: impl Into<String>) -> Self {
        self.token_url_kwarg = kwarg.into();
        self
    }

    pub fn get_authorization_token<'r>(&self, request: &'r HttpRequest) -> Option<&'r str> {
        request.kwarg(&self.token_url_kwarg).filter(|t| !t.is_empty())
    }

    /// The authorization for the request's token; `NotFound` when there is
    /// none.
    pub async fn get_authorization(
        &self,
        request: &HttpRequest,
    ) -> CoreResult<TokenAuthorization<P>> {
        let token = self
            .get_authorization_token(request)
            .ok_or_else(|| CoreError::NotFound("Missing authorization token".into()))?;
        let mut q = Q::eq("token", token);
        if let Some(user_id) = request.user().id {
            q = q & Q::eq("created_user_id", user_id);
        }
        self.store.get(&q).await.map_err(|e| {
            if e.is_not_found() {
                CoreError::NotFound("No such authorization".into())
            } else {
                e
            }
        })
    }
}

/// Adds the authorization under `authorization`.
pub fn add_authorization_to_context<P: AuthorizationPolicy>(
    authorization: &TokenAuthorization<P>,
    context: &mut Context,
) {
    context.insert(
        "authorization".into(),
        serde_json::to_value(authorization).unwrap_or_default(),
    );
}

#[async_trait]
impl<V, S, P> crate::view::View for AuthorizationTokenRequiredViewMixin<V, S, P>
where
    V: AuthorizedView<P>,
    S: ModelStore<TokenAuthorization<P>> + ?Sized,
    P: AuthorizationPolicy,
{
    async fn dispatch(&self, request: HttpRequest) -> HttpResponse {
        let authorization = match self.get_authorization(&request).await {
            Ok(authorization) => authorization,
            Err(e) => return e.into(),
        };
        if authorization.is_expired() {
            tracing::debug!(id = ?authorization.id, "authorization expired");
            return redirect(&self.expired_url);
        }
        self.view.dispatch_authorized(request, authorization).await
    }
}
