//! Authentication backends.

use std::sync::Arc;

use async_trait::async_trait;
use django_core_common::error::{CoreError, CoreResult};
use django_core_common::utils::validators::is_valid_email;
use django_core_db::Q;

use crate::user::{User, UserStore};

/// A pluggable credential check.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Returns the user when `password` matches, `Ok(None)` when the
    /// credentials don't, and `Err` when the lookup itself fails.
    async fn authenticate(&self, username: &str, password: &str) -> CoreResult<Option<User>>;

    /// Loads a user by primary key.
    async fn get_user(&self, user_id: i64) -> CoreResult<Option<User>>;
}

/// Logs users in with either their email address or their username.
///
/// The identifier is trimmed and lowercased. When it looks like an email the
/// user is looked up by email, otherwise by username.
///
/// # Examples
///
/// ```
/// # tokio_test::block_on(async {
/// use std::sync::Arc;
/// use django_core_auth::{AuthBackend, EmailOrUsernameBackend, User};
/// use django_core_db::{save_model, InMemoryStore};
///
/// let store = Arc::new(InMemoryStore::<User>::new());
/// let mut user = User::new("ann", "ann@example.com");
/// user.set_password("pa55word").await.unwrap();
/// save_model(store.as_ref(), &mut user).await.unwrap();
///
/// let backend = EmailOrUsernameBackend::new(store);
/// let found = backend.authenticate(" ANN@example.com", "pa55word").await.unwrap();
/// assert_eq!(found.map(|u| u.username), Some("ann".to_string()));
/// # });
/// ```
pub struct EmailOrUsernameBackend<S: UserStore + ?Sized> {
    store: Arc<S>,
}

impl<S: UserStore + ?Sized> EmailOrUsernameBackend<S> {
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Looks a user up by email or username after normalizing the identifier.
    pub async fn get_by_username_or_email(&self, username_or_email: &str) -> CoreResult<Option<User>> {
        let identifier = username_or_email.trim().to_lowercase();
        if is_valid_email(&identifier) {
            self.get_by_email(&identifier).await
        } else {
            self.get_by_username(&identifier).await
        }
    }

    pub async fn get_by_email(&self, email: &str) -> CoreResult<Option<User>> {
        self.get_one(Q::eq("email", email.to_lowercase())).await
    }

    pub async fn get_by_username(&self, username: &str) -> CoreResult<Option<User>> {
        self.get_one(Q::eq("username", username)).await
    }

    async fn get_one(&self, q: Q) -> CoreResult<Option<User>> {
        match self.store.get(&q).await {
            Ok(user) => Ok(Some(user)),
            Err(CoreError::DoesNotExist(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl<S: UserStore + ?Sized> AuthBackend for EmailOrUsernameBackend<S> {
    async fn authenticate(&self, username: &str, password: &str) -> CoreResult<Option<User>> {
        let Some(user) = self.get_by_username_or_email(username).await? else {
            tracing::debug!("authentication failed: unknown user");
            return Ok(None);
        };

        if user.check_password(password).await? {
            tracing::debug!(user_id = ?user.id, "authenticated");
            Ok(Some(user))
        } else {
            tracing::debug!(user_id = ?user.id, "authentication failed: bad password");
            Ok(None)
        }
    }

    async fn get_user(&self, user_id: i64) -> CoreResult<Option<User>> {
        self.get_one(Q::eq("id", user_id)).await
    }
}
