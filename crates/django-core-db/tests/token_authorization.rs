//! Integration tests for token authorizations.

use chrono::{Duration, Utc};
use django_core_common::utils::list::OneOrMany;
use django_core_db::mixins::{Expires, TokenModel};
use django_core_db::token_authorization::expired_dttm;
use django_core_db::{
    save_model, AuthorizationPolicy, CommonManager, InMemoryStore, ModelStore, ReasonFilter,
    TokenAuthorization, TokenAuthorizationManager, TokenManager, Q,
};

#[derive(Debug, Clone, Default, PartialEq)]
struct EmailConfirmation;

impl AuthorizationPolicy for EmailConfirmation {
    const DEFAULT_TOKEN_DURATION_DAYS: i64 = 7;
    const REASON_DEFAULT: Option<&'static str> = Some("confirm_email");
    const TOKEN_LENGTH: usize = 30;
}

type Confirmation = TokenAuthorization<EmailConfirmation>;

#[tokio::test]
async fn test_save_applies_defaults() {
    let store: InMemoryStore<TokenAuthorization> = InMemoryStore::new();
    let mut auth: TokenAuthorization = TokenAuthorization::for_email("user@example.com");
    let before = Utc::now().naive_utc();
    save_model(&store, &mut auth).await.unwrap();

    let token = auth.token.clone().unwrap();
    assert_eq!(token.len(), 75);
    let expires = auth.expires.unwrap();
    assert!(expires >= before + Duration::days(1));
    assert!(expires <= Utc::now().naive_utc() + Duration::days(1));
    assert_eq!(auth.reason, None);
    assert!(!auth.email_sent);
    assert!(auth.is_valid());
    assert_eq!(store.get_by_token_or_404(&token).await.unwrap().id, auth.id);
}

#[tokio::test]
async fn test_policy_defaults() {
    let store: InMemoryStore<Confirmation> = InMemoryStore::new();
    let created = store
        .bulk_create(vec![
            Confirmation::for_email("a@example.com"),
            Confirmation::for_email("b@example.com").with_reason("other"),
        ])
        .await
        .unwrap();

    assert_eq!(created[0].reason.as_deref(), Some("confirm_email"));
    assert_eq!(created[1].reason.as_deref(), Some("other"));
    for auth in &created {
        assert_eq!(auth.token.as_deref().map(str::len), Some(Confirmation::TOKEN_LENGTH));
        assert!(auth.expires.unwrap() > Utc::now().naive_utc() + Duration::days(6));
    }
}

#[tokio::test]
async fn test_expire_and_save() {
    let store: InMemoryStore<TokenAuthorization> = InMemoryStore::new();
    let mut auth: TokenAuthorization = TokenAuthorization::for_user(3);
    save_model(&store, &mut auth).await.unwrap();
    assert_eq!(auth.audit.last_modified_user_id, Some(3));

    auth.expire_and_save(&store).await.unwrap();
    let stored = store.get_by_id_or_404(auth.id.unwrap()).await.unwrap();
    assert_eq!(stored.expires, Some(expired_dttm()));
    assert!(stored.is_expired());
    assert!(!stored.is_valid());
}

async fn confirmations() -> InMemoryStore<Confirmation> {
    let store = InMemoryStore::new();
    let seed = vec![
        Confirmation::for_email("a@example.com"),
        Confirmation::for_email("a@example.com").with_reason("password_reset"),
        Confirmation::for_email("b@example.com"),
        Confirmation::for_email("c@example.com"),
    ];
    store.bulk_create(seed).await.unwrap();
    store
}

async fn expired_count(store: &InMemoryStore<Confirmation>) -> usize {
    store
        .filter(&Q::eq("expires", expired_dttm()))
        .await
        .unwrap()
        .len()
}

#[tokio::test]
async fn test_expire_by_email_default_reason() {
    let store = confirmations().await;
    let expired = store
        .expire_by_email(OneOrMany::One("a@example.com".into()), ReasonFilter::Default)
        .await
        .unwrap();
    assert_eq!(expired, Some(1));
    assert_eq!(expired_count(&store).await, 1);
}

#[tokio::test]
async fn test_expire_by_email_any_reason() {
    let store = confirmations().await;
    let expired = store
        .expire_by_email(OneOrMany::One("a@example.com".into()), ReasonFilter::Any)
        .await
        .unwrap();
    assert_eq!(expired, Some(2));

    let exact = store
        .expire_by_email(
            OneOrMany::One("b@example.com".into()),
            ReasonFilter::Exact("password_reset".into()),
        )
        .await
        .unwrap();
    assert_eq!(exact, Some(0));
}

#[tokio::test]
async fn test_expire_by_emails() {
    let store = confirmations().await;
    let expired = store
        .expire_by_emails(
            vec![
                " b@example.com ".into(),
                "c@example.com".into(),
                "c@example.com".into(),
                String::new(),
            ],
            ReasonFilter::Default,
        )
        .await
        .unwrap();
    assert_eq!(expired, Some(2));
    assert_eq!(expired_count(&store).await, 2);
}

#[tokio::test]
async fn test_expire_by_email_without_addresses() {
    let store = confirmations().await;
    assert_eq!(
        store
            .expire_by_email(OneOrMany::One(String::new()), ReasonFilter::Any)
            .await
            .unwrap(),
        None
    );
    assert_eq!(
        store
            .expire_by_emails(vec![" ".into()], ReasonFilter::Any)
            .await
            .unwrap(),
        None
    );
    assert_eq!(expired_count(&store).await, 0);
}
