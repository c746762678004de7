//! Integration tests for the manager capabilities over an in-memory store.

mod common;

use common::{Article, Tag};
use django_core_common::CoreError;
use django_core_db::mixins::ContentTypeRegistry;
use django_core_db::{
    BaseManager, CommonManager, GenericManager, InMemoryStore, ModelStore, SlugManager, Q,
    UserManager,
};

async fn seeded(titles: &[&str]) -> InMemoryStore<Article> {
    let store = InMemoryStore::new();
    for title in titles {
        store.insert(&mut Article::new(title)).await.unwrap();
    }
    store
}

// ── BaseManager ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_or_none() {
    let store = seeded(&["first"]).await;
    let found = store.get_or_none(&Q::eq("title", "first")).await.unwrap();
    assert_eq!(found.unwrap().title, "first");
    assert!(store
        .get_or_none(&Q::eq("title", "missing"))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_get_or_none_multiple_is_error() {
    let store = seeded(&["dup", "dup"]).await;
    let err = store.get_or_none(&Q::eq("title", "dup")).await.unwrap_err();
    assert!(matches!(err, CoreError::MultipleObjectsReturned(_)));
}

// ── CommonManager ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_by_id() {
    let store = seeded(&["a", "b"]).await;
    assert_eq!(store.get_by_id(2).await.unwrap().unwrap().title, "b");
    assert!(store.get_by_id(99).await.unwrap().is_none());
}

#[tokio::test]
async fn test_get_by_id_or_404() {
    let store = seeded(&["a"]).await;
    assert_eq!(store.get_by_id_or_404(1).await.unwrap().title, "a");
    let err = store.get_by_id_or_404(5).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn test_get_by_ids() {
    let store = seeded(&["a", "b", "c"]).await;
    let found = store.get_by_ids(&[1, 3, 7]).await.unwrap();
    let titles: Vec<&str> = found.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["a", "c"]);
}

#[tokio::test]
async fn test_bulk_create_runs_save_prep() {
    let store = InMemoryStore::new();
    let created = store
        .bulk_create(vec![Article::new("  one "), Article::new("two")])
        .await
        .unwrap();
    assert_eq!(created.len(), 2);
    assert!(created.iter().all(|a| a.id.is_some()));
    assert!(created.iter().all(|a| a.audit.created_dttm.is_some()));
    assert_eq!(created[0].title, "one");
    assert_ne!(created[0].token, created[1].token);
    assert_eq!(store.len().await, 2);
}

#[tokio::test]
async fn test_bulk_create_is_atomic() {
    let store = InMemoryStore::new();
    store
        .insert(&mut Article::with_slug("x", "taken"))
        .await
        .unwrap();
    let err = store
        .bulk_create(vec![
            Article::with_slug("y", "free"),
            Article::with_slug("z", "taken"),
        ])
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::IntegrityError(_)));
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_delete_by_id() {
    let store = seeded(&["a", "b", "c"]).await;
    assert!(store.delete_by_id(1).await.unwrap());
    assert!(!store.delete_by_id(1).await.unwrap());
    assert!(store.delete_by_ids(&[2, 3, 4]).await.unwrap());
    assert!(store.is_empty().await);
    assert!(!store.delete_by_ids(&[]).await.unwrap());
}

// ── SlugManager ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_by_slug() {
    let store = InMemoryStore::new();
    store
        .insert(&mut Article::with_slug("Hello", "hello"))
        .await
        .unwrap();
    assert_eq!(store.get_by_slug("hello").await.unwrap().unwrap().title, "Hello");
    assert!(store.get_by_slug("nope").await.unwrap().is_none());
    assert!(store.get_by_slug_or_404("nope").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_is_slug_available() {
    let store = InMemoryStore::new();
    store
        .insert(&mut Article::with_slug("Hello", "hello"))
        .await
        .unwrap();
    assert!(!store.is_slug_available("hello").await.unwrap());
    assert!(store.is_slug_available("other").await.unwrap());
}

#[tokio::test]
async fn test_get_next_slug() {
    let store = InMemoryStore::new();
    assert_eq!(store.get_next_slug("Hello World").await.unwrap(), "hello-world");

    store
        .insert(&mut Article::with_slug("a", "hello-world"))
        .await
        .unwrap();
    assert_eq!(store.get_next_slug("Hello World").await.unwrap(), "hello-world-1");

    store
        .insert(&mut Article::with_slug("b", "hello-world-1"))
        .await
        .unwrap();
    assert_eq!(store.get_next_slug("Hello World").await.unwrap(), "hello-world-2");
}

#[tokio::test]
async fn test_get_next_slug_in_scope() {
    let store = InMemoryStore::new();
    let mut article = Article::with_slug("a", "post");
    article.user_id = Some(1);
    store.insert(&mut article).await.unwrap();

    let other_user = Q::eq("user_id", 2);
    assert_eq!(store.get_next_slug_in("Post", other_user).await.unwrap(), "post");
    assert_eq!(
        store.get_next_slug_in("Post", Q::eq("user_id", 1)).await.unwrap(),
        "post-1"
    );
}

// ── UserManager ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_by_user() {
    let store = InMemoryStore::new();
    for (title, user) in [("a", 1), ("b", 2), ("c", 1)] {
        let mut article = Article::new(title);
        article.user_id = Some(user);
        store.insert(&mut article).await.unwrap();
    }

    let owner = Article {
        id: Some(1),
        ..Article::default()
    };
    let owned = store.get_by_user(&owner).await.unwrap();
    assert_eq!(owned.len(), 2);
    assert_eq!(store.get_by_user_id(2).await.unwrap().len(), 1);
    assert!(store.get_by_user(&Article::default()).await.unwrap().is_empty());
}

// ── GenericManager ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_or_create_generic() {
    let mut registry = ContentTypeRegistry::new();
    let article_type = registry.register::<Article>();

    let articles = seeded(&["tagged"]).await;
    let article = articles.get_by_id_or_404(1).await.unwrap();

    let tags: InMemoryStore<Tag> = InMemoryStore::new();
    let (tag, created) = tags.get_or_create_generic(&registry, &article).await.unwrap();
    assert!(created);
    assert_eq!(tag.content_type_id, article_type.id);
    assert_eq!(tag.object_id, 1);

    let (again, created) = tags.get_or_create_generic(&registry, &article).await.unwrap();
    assert!(!created);
    assert_eq!(again.id, tag.id);

    assert_eq!(tags.get_by_content_type(&article_type).await.unwrap().len(), 1);
    assert_eq!(tags.get_by_model::<Article>(&registry).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_generic_requires_registration_and_saved_object() {
    let registry = ContentTypeRegistry::new();
    let tags: InMemoryStore<Tag> = InMemoryStore::new();
    let article = Article {
        id: Some(1),
        ..Article::default()
    };
    let err = tags.get_or_create_generic(&registry, &article).await.unwrap_err();
    assert!(matches!(err, CoreError::ImproperlyConfigured(_)));

    let mut registry = ContentTypeRegistry::new();
    registry.register::<Article>();
    let err = tags
        .get_or_create_generic(&registry, &Article::default())
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::DatabaseError(_)));
}
