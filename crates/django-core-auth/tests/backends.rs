use std::sync::Arc;

use django_core_auth::{AuthBackend, EmailOrUsernameBackend, User};
use django_core_common::CoreError;
use django_core_db::{save_model, InMemoryStore, ModelStore};

async fn setup() -> (Arc<InMemoryStore<User>>, EmailOrUsernameBackend<InMemoryStore<User>>) {
    let store = Arc::new(InMemoryStore::<User>::new());
    let mut ann = User::new("ann", "ann@example.com");
    ann.set_password("correct-horse").await.unwrap();
    save_model(store.as_ref(), &mut ann).await.unwrap();

    let mut bob = User::new("bob", "bob@example.com");
    bob.set_unusable_password();
    save_model(store.as_ref(), &mut bob).await.unwrap();

    let backend = EmailOrUsernameBackend::new(Arc::clone(&store));
    (store, backend)
}

// ── Lookup ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_lookup_by_email_and_username() {
    let (_store, backend) = setup().await;

    let by_email = backend.get_by_username_or_email("  Ann@Example.com ").await.unwrap();
    assert_eq!(by_email.unwrap().username, "ann");

    let by_username = backend.get_by_username_or_email(" ANN").await.unwrap();
    assert_eq!(by_username.unwrap().email, "ann@example.com");

    assert!(backend
        .get_by_username_or_email("nobody@example.com")
        .await
        .unwrap()
        .is_none());
    assert!(backend.get_by_username_or_email("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_email_is_an_error() {
    let (store, backend) = setup().await;
    save_model(store.as_ref(), &mut User::new("ann2", "ann@example.com"))
        .await
        .unwrap();

    let err = backend.get_by_email("ann@example.com").await.unwrap_err();
    assert!(matches!(err, CoreError::MultipleObjectsReturned(_)));
}

// ── Authenticate ────────────────────────────────────────────────────

#[tokio::test]
async fn test_authenticate() {
    let (_store, backend) = setup().await;

    let user = backend.authenticate("ann", "correct-horse").await.unwrap();
    assert_eq!(user.unwrap().username, "ann");

    let user = backend
        .authenticate("ann@example.com", "correct-horse")
        .await
        .unwrap();
    assert!(user.is_some());

    assert!(backend.authenticate("ann", "wrong").await.unwrap().is_none());
    assert!(backend.authenticate("zed", "correct-horse").await.unwrap().is_none());
}

#[tokio::test]
async fn test_unusable_password_never_authenticates() {
    let (_store, backend) = setup().await;
    assert!(backend.authenticate("bob", "").await.unwrap().is_none());
}

#[tokio::test]
async fn test_get_user() {
    let (store, backend) = setup().await;
    let ann = store.all().await.unwrap().into_iter().find(|u| u.username == "ann").unwrap();

    let found = backend.get_user(ann.id.unwrap()).await.unwrap();
    assert_eq!(found, Some(ann));
    assert!(backend.get_user(999).await.unwrap().is_none());
}
