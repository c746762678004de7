//! Expiring authorization tokens, typically emailed to a user.
//!
//! [`TokenAuthorization`] is generic over an [`AuthorizationPolicy`] that sets
//! the token length, default lifetime and default reason. Applications define
//! their own policies (password reset, email confirmation, ...) instead of
//! subclassing the model.

use std::collections::BTreeSet;
use std::fmt;
use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveDateTime, Utc};
use django_core_common::error::CoreResult;
use django_core_common::utils::list::OneOrMany;
use serde::{Deserialize, Serialize};

use crate::hooks::{save_model, SavePrep};
use crate::mixins::base::{AbstractBaseModel, AuditFields};
use crate::mixins::dates::Expires;
use crate::mixins::tokens::{assign_tokens, TokenModel};
use crate::model::{unknown_field, Model};
use crate::query::Q;
use crate::store::ModelStore;
use crate::value::{FromValue, Value};

/// Token length, lifetime and default reason of a kind of authorization.
pub trait AuthorizationPolicy:
    fmt::Debug + Clone + Default + PartialEq + Send + Sync + 'static
{
    /// Days a new authorization stays valid.
    const DEFAULT_TOKEN_DURATION_DAYS: i64 = 1;
    /// Reason stored on new authorizations that don't set one.
    const REASON_DEFAULT: Option<&'static str> = None;
    /// Length of generated tokens.
    const TOKEN_LENGTH: usize = 75;
}

/// The policy used when none is given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultAuthorization;

impl AuthorizationPolicy for DefaultAuthorization {}

/// The expiry written by [`TokenAuthorization::expire`].
pub fn expired_dttm() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1970, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(NaiveDateTime::MIN)
}

/// A random token granting access until it expires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct TokenAuthorization<P: AuthorizationPolicy = DefaultAuthorization> {
    pub id: Option<i64>,
    /// Unique token, generated on first save.
    pub token: Option<String>,
    pub email_address: Option<String>,
    /// UTC expiry, defaulted on save.
    pub expires: Option<NaiveDateTime>,
    pub reason: Option<String>,
    pub user_id: Option<i64>,
    /// Free-form notes.
    pub text: Option<String>,
    /// Whether the token has been emailed.
    pub email_sent: bool,
    #[serde(flatten)]
    pub audit: AuditFields,
    #[serde(skip)]
    policy: PhantomData<P>,
}

impl<P: AuthorizationPolicy> Default for TokenAuthorization<P> {
    fn default() -> Self {
        Self {
            id: None,
            token: None,
            email_address: None,
            expires: None,
            reason: None,
            user_id: None,
            text: None,
            email_sent: false,
            audit: AuditFields::default(),
            policy: PhantomData,
        }
    }
}

impl<P: AuthorizationPolicy> TokenAuthorization<P> {
    /// An unsaved authorization for `email_address`.
    pub fn for_email(email_address: impl Into<String>) -> Self {
        Self {
            email_address: Some(email_address.into()),
            ..Self::default()
        }
    }

    /// An unsaved authorization for the user with `user_id`.
    pub fn for_user(user_id: i64) -> Self {
        Self {
            user_id: Some(user_id),
            audit: AuditFields::created_by(user_id),
            ..Self::default()
        }
    }

    /// Sets the reason.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Fills in the expiry and, for new objects, the default reason.
    fn apply_defaults(&mut self, now: NaiveDateTime) {
        if self.expires.is_none() {
            self.expires = Some(now + Duration::days(P::DEFAULT_TOKEN_DURATION_DAYS));
        }
        if self.id.is_none() && self.reason.is_none() {
            self.reason = P::REASON_DEFAULT.map(str::to_string);
        }
    }

    /// Whether the token can still be used.
    pub fn is_valid(&self) -> bool {
        !self.is_expired()
    }

    /// Expires the token in memory.
    pub fn expire(&mut self) {
        self.expires = Some(expired_dttm());
    }

    /// Expires the token and saves it.
    pub async fn expire_and_save<S>(&mut self, store: &S) -> CoreResult<()>
    where
        S: ModelStore<Self> + ?Sized,
    {
        self.expire();
        save_model(store, self).await
    }
}

impl<P: AuthorizationPolicy> Expires for TokenAuthorization<P> {
    fn expires_dttm(&self) -> Option<NaiveDateTime> {
        self.expires
    }

    fn is_expired_at(&self, now: NaiveDateTime) -> bool {
        self.expires.is_some_and(|expires| now > expires)
    }
}

impl<P: AuthorizationPolicy> Model for TokenAuthorization<P> {
    fn table_name() -> &'static str {
        "django_core_tokenauthorization"
    }

    fn app_label() -> &'static str {
        "django_core"
    }

    fn model_name() -> &'static str {
        "tokenauthorization"
    }

    fn verbose_name() -> String {
        "token authorization".to_string()
    }

    fn field_names() -> &'static [&'static str] {
        &[
            "id",
            "token",
            "email_address",
            "expires",
            "reason",
            "user_id",
            "text",
            "email_sent",
            "created_user_id",
            "created_dttm",
            "last_modified_user_id",
            "last_modified_dttm",
        ]
    }

    fn char_field_names() -> &'static [&'static str] {
        &["token", "email_address", "reason"]
    }

    fn unique_field_names() -> &'static [&'static str] {
        &["token"]
    }

    fn field_default(name: &str) -> Value {
        match name {
            "email_sent" => Value::Bool(false),
            _ => Value::Null,
        }
    }

    fn pk(&self) -> Option<i64> {
        self.id
    }

    fn set_pk(&mut self, pk: Option<i64>) {
        self.id = pk;
    }

    fn field_value(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(self.id.into()),
            "token" => Some(self.token.clone().into()),
            "email_address" => Some(self.email_address.clone().into()),
            "expires" => Some(self.expires.into()),
            "reason" => Some(self.reason.clone().into()),
            "user_id" => Some(self.user_id.into()),
            "text" => Some(self.text.clone().into()),
            "email_sent" => Some(self.email_sent.into()),
            other => self.audit.field_value(other),
        }
    }

    fn set_field_value(&mut self, name: &str, value: Value) -> CoreResult<()> {
        match name {
            "id" => self.id = FromValue::from_value(value)?,
            "token" => self.token = FromValue::from_value(value)?,
            "email_address" => self.email_address = FromValue::from_value(value)?,
            "expires" => self.expires = FromValue::from_value(value)?,
            "reason" => self.reason = FromValue::from_value(value)?,
            "user_id" => self.user_id = FromValue::from_value(value)?,
            "text" => self.text = FromValue::from_value(value)?,
            "email_sent" => self.email_sent = FromValue::from_value(value)?,
            other => {
                if !self.audit.set_field_value(other, value)? {
                    return Err(unknown_field::<Self>(other));
                }
            }
        }
        Ok(())
    }
}

impl<P: AuthorizationPolicy> AbstractBaseModel for TokenAuthorization<P> {
    fn audit(&self) -> &AuditFields {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditFields {
        &mut self.audit
    }
}

impl<P: AuthorizationPolicy> TokenModel for TokenAuthorization<P> {
    const TOKEN_LENGTH: usize = P::TOKEN_LENGTH;

    fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }
}

#[async_trait]
impl<P: AuthorizationPolicy> SavePrep for TokenAuthorization<P> {
    async fn save_prep<S>(store: &S, instances: &mut [Self]) -> CoreResult<()>
    where
        S: ModelStore<Self> + ?Sized,
    {
        let now = Utc::now().naive_utc();
        for instance in instances.iter_mut() {
            instance.apply_defaults(now);
        }
        assign_tokens(store, instances).await?;
        Self::audit_save_prep(instances)
    }
}

// ── TokenAuthorizationManager ──────────────────────────────────────────

/// Which reason an expiry applies to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ReasonFilter {
    /// The policy's default reason, or any reason if it has none.
    #[default]
    Default,
    /// Any reason.
    Any,
    /// Exactly this reason.
    Exact(String),
}

impl ReasonFilter {
    fn to_q<P: AuthorizationPolicy>(&self) -> Option<Q> {
        match self {
            Self::Default => P::REASON_DEFAULT.map(|reason| Q::eq("reason", reason)),
            Self::Any => None,
            Self::Exact(reason) => Some(Q::eq("reason", reason.as_str())),
        }
    }
}

/// Bulk expiry of authorizations by email address.
#[async_trait]
pub trait TokenAuthorizationManager<P: AuthorizationPolicy>:
    ModelStore<TokenAuthorization<P>>
{
    /// Expires every authorization sent to `email_address`.
    ///
    /// A list of addresses is trimmed and deduplicated first. Returns the
    /// number of authorizations expired, or `None` when there was no address
    /// to match.
    async fn expire_by_email(
        &self,
        email_address: OneOrMany<String>,
        reason: ReasonFilter,
    ) -> CoreResult<Option<usize>> {
        let email_q = match email_address {
            OneOrMany::One(email) if email.is_empty() => return Ok(None),
            OneOrMany::One(email) => Q::eq("email_address", email),
            OneOrMany::Many(emails) => {
                let emails: BTreeSet<String> = emails
                    .iter()
                    .map(|e| e.trim())
                    .filter(|e| !e.is_empty())
                    .map(str::to_string)
                    .collect();
                if emails.is_empty() {
                    return Ok(None);
                }
                Q::is_in("email_address", emails)
            }
        };
        let q = match reason.to_q::<P>() {
            Some(reason_q) => email_q & reason_q,
            None => email_q,
        };

        let expired = self
            .update_where(&q, &[("expires", expired_dttm().into())])
            .await?;
        tracing::debug!(expired, reason = ?reason, "expired token authorizations by email");
        Ok(Some(expired))
    }

    /// [`Self::expire_by_email`] for a list of addresses.
    async fn expire_by_emails(
        &self,
        email_addresses: Vec<String>,
        reason: ReasonFilter,
    ) -> CoreResult<Option<usize>> {
        self.expire_by_email(OneOrMany::Many(email_addresses), reason)
            .await
    }
}

impl<P, S> TokenAuthorizationManager<P> for S
where
    P: AuthorizationPolicy,
    S: ModelStore<TokenAuthorization<P>> + ?Sized,
{
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct PasswordReset;

    impl AuthorizationPolicy for PasswordReset {
        const DEFAULT_TOKEN_DURATION_DAYS: i64 = 3;
        const REASON_DEFAULT: Option<&'static str> = Some("password_reset");
        const TOKEN_LENGTH: usize = 20;
    }

    #[test]
    fn test_defaults_applied_once() {
        let now = Utc::now().naive_utc();
        let mut auth = TokenAuthorization::<PasswordReset>::for_email("a@example.com");
        auth.apply_defaults(now);
        assert_eq!(auth.expires, Some(now + Duration::days(3)));
        assert_eq!(auth.reason.as_deref(), Some("password_reset"));

        let mut saved = TokenAuthorization::<PasswordReset> {
            id: Some(1),
            ..TokenAuthorization::default()
        };
        saved.apply_defaults(now);
        assert_eq!(saved.reason, None);
    }

    #[test]
    fn test_expire() {
        let mut auth: TokenAuthorization = TokenAuthorization::for_user(4);
        assert!(auth.is_valid());
        auth.expires = Some(Utc::now().naive_utc() + Duration::hours(1));
        assert!(auth.is_valid());
        auth.expire();
        assert!(auth.is_expired());
        assert_eq!(auth.expires, Some(expired_dttm()));
    }

    #[test]
    fn test_reason_filter() {
        assert!(ReasonFilter::Default.to_q::<DefaultAuthorization>().is_none());
        assert!(ReasonFilter::Default.to_q::<PasswordReset>().is_some());
        assert!(ReasonFilter::Any.to_q::<PasswordReset>().is_none());
        assert_eq!(TokenAuthorization::<PasswordReset>::TOKEN_LENGTH, 20);
        assert_eq!(TokenAuthorization::<DefaultAuthorization>::TOKEN_LENGTH, 75);
    }
}
