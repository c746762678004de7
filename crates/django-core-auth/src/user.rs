//! The persisted user model.

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use django_core_common::error::CoreResult;
use django_core_common::utils::random::random_alphanum;
use django_core_db::model::unknown_field;
use django_core_db::{FromValue, Model, ModelStore, SavePrep, Value};
use django_core_http::RequestUser;
use serde::{Deserialize, Serialize};

use crate::hashers::{self, UNUSABLE_PASSWORD_PREFIX};

/// A site user.
///
/// `password` holds an encoded hash, never the raw password. Emails are
/// stored lowercased so lookups by email are exact matches.
///
/// # Examples
///
/// ```
/// use django_core_auth::User;
///
/// let user = User::new("Alice", "Alice@Example.com");
/// assert_eq!(user.username, "Alice");
/// assert_eq!(user.email, "alice@example.com");
/// assert!(!user.has_usable_password());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Option<i64>,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub last_login: Option<NaiveDateTime>,
    pub date_joined: NaiveDateTime,
}

impl Default for User {
    fn default() -> Self {
        Self {
            id: None,
            username: String::new(),
            email: String::new(),
            password: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            is_active: true,
            is_staff: false,
            is_superuser: false,
            last_login: None,
            date_joined: Utc::now().naive_utc(),
        }
    }
}

impl User {
    /// An active user without a usable password.
    pub fn new(username: impl Into<String>, email: &str) -> Self {
        Self {
            username: username.into(),
            email: email.trim().to_lowercase(),
            ..Self::default()
        }
    }

    /// Hashes and stores `raw_password`.
    pub async fn set_password(&mut self, raw_password: &str) -> CoreResult<()> {
        self.password = hashers::make_password(raw_password).await?;
        Ok(())
    }

    /// Checks `raw_password` against the stored hash.
    pub async fn check_password(&self, raw_password: &str) -> CoreResult<bool> {
        hashers::check_password(raw_password, &self.password).await
    }

    /// Marks the password as unusable so it never verifies.
    pub fn set_unusable_password(&mut self) {
        self.password = format!("{UNUSABLE_PASSWORD_PREFIX}{}", random_alphanum(40));
    }

    pub fn has_usable_password(&self) -> bool {
        hashers::is_password_usable(&self.password)
    }

    /// "first last", falling back to the username.
    pub fn get_full_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }

    /// The identity attached to requests made by this user.
    pub fn to_request_user(&self) -> RequestUser {
        RequestUser {
            id: self.id,
            username: self.username.clone(),
            is_staff: self.is_staff,
            is_superuser: self.is_superuser,
        }
    }
}

impl From<&User> for RequestUser {
    fn from(user: &User) -> Self {
        user.to_request_user()
    }
}

impl Model for User {
    fn table_name() -> &'static str {
        "auth_user"
    }

    fn app_label() -> &'static str {
        "auth"
    }

    fn model_name() -> &'static str {
        "user"
    }

    fn field_names() -> &'static [&'static str] {
        &[
            "id",
            "username",
            "email",
            "password",
            "first_name",
            "last_name",
            "is_active",
            "is_staff",
            "is_superuser",
            "last_login",
            "date_joined",
        ]
    }

    fn char_field_names() -> &'static [&'static str] {
        &["username", "email", "first_name", "last_name"]
    }

    fn unique_field_names() -> &'static [&'static str] {
        &["username"]
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
            "username" => Some(self.username.clone().into()),
            "email" => Some(self.email.clone().into()),
            "password" => Some(self.password.clone().into()),
            "first_name" => Some(self.first_name.clone().into()),
            "last_name" => Some(self.last_name.clone().into()),
            "is_active" => Some(self.is_active.into()),
            "is_staff" => Some(self.is_staff.into()),
            "is_superuser" => Some(self.is_superuser.into()),
            "last_login" => Some(self.last_login.into()),
            "date_joined" => Some(self.date_joined.into()),
            _ => None,
        }
    }

    fn set_field_value(&mut self, name: &str, value: Value) -> CoreResult<()> {
        match name {
            "id" => self.id = FromValue::from_value(value)?,
            "username" => self.username = FromValue::from_value(value)?,
            "email" => self.email = FromValue::from_value(value)?,
            "password" => self.password = FromValue::from_value(value)?,
            "first_name" => self.first_name = FromValue::from_value(value)?,
            "last_name" => self.last_name = FromValue::from_value(value)?,
            "is_active" => self.is_active = FromValue::from_value(value)?,
            "is_staff" => self.is_staff = FromValue::from_value(value)?,
            "is_superuser" => self.is_superuser = FromValue::from_value(value)?,
            "last_login" => self.last_login = FromValue::from_value(value)?,
            "date_joined" => self.date_joined = FromValue::from_value(value)?,
            _ => return Err(unknown_field::<Self>(name)),
        }
        Ok(())
    }
}

#[async_trait]
impl SavePrep for User {
    async fn save_prep<S>(_store: &S, instances: &mut [Self]) -> CoreResult<()>
    where
        S: ModelStore<Self> + ?Sized,
    {
        for user in instances.iter_mut() {
            user.strip_fields()?;
            user.email = user.email.to_lowercase();
        }
        Ok(())
    }
}

/// Any store that persists [`User`]s.
pub trait UserStore: ModelStore<User> {}

impl<S: ModelStore<User> + ?Sized> UserStore for S {}
