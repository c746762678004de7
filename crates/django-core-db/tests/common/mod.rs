//! Test models shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use django_core_common::CoreResult;
use django_core_db::mixins::{
    assign_tokens, AbstractBaseModel, AuditFields, GenericObject, SafeDeleteModel, TokenModel,
    UrlLink,
};
use django_core_db::model::unknown_field;
use django_core_db::{FromValue, Model, ModelStore, SavePrep, SlugModel, UserOwnedModel, Value};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Article {
    pub id: Option<i64>,
    pub title: String,
    pub slug: Option<String>,
    pub token: Option<String>,
    pub user_id: Option<i64>,
    pub is_deleted: bool,
    pub audit: AuditFields,
}

impl Article {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Self::default()
        }
    }

    pub fn with_slug(title: &str, slug: &str) -> Self {
        Self {
            slug: Some(slug.to_string()),
            ..Self::new(title)
        }
    }

    pub fn with_token(title: &str, token: &str) -> Self {
        Self {
            token: Some(token.to_string()),
            ..Self::new(title)
        }
    }
}

impl Model for Article {
    fn table_name() -> &'static str {
        "blog_article"
    }
    fn app_label() -> &'static str {
        "blog"
    }
    fn model_name() -> &'static str {
        "article"
    }
    fn field_names() -> &'static [&'static str] {
        &[
            "id",
            "title",
            "slug",
            "token",
            "user_id",
            "is_deleted",
            "created_user_id",
            "created_dttm",
            "last_modified_user_id",
            "last_modified_dttm",
        ]
    }
    fn char_field_names() -> &'static [&'static str] {
        &["title", "slug"]
    }
    fn unique_field_names() -> &'static [&'static str] {
        &["slug", "token"]
    }
    fn field_default(name: &str) -> Value {
        match name {
            "title" => Value::from(""),
            "is_deleted" => Value::Bool(false),
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
            "title" => Some(self.title.clone().into()),
            "slug" => Some(self.slug.clone().into()),
            "token" => Some(self.token.clone().into()),
            "user_id" => Some(self.user_id.into()),
            "is_deleted" => Some(self.is_deleted.into()),
            other => self.audit.field_value(other),
        }
    }
    fn set_field_value(&mut self, name: &str, value: Value) -> CoreResult<()> {
        match name {
            "id" => self.id = FromValue::from_value(value)?,
            "title" => self.title = FromValue::from_value(value)?,
            "slug" => self.slug = FromValue::from_value(value)?,
            "token" => self.token = FromValue::from_value(value)?,
            "user_id" => self.user_id = FromValue::from_value(value)?,
            "is_deleted" => self.is_deleted = FromValue::from_value(value)?,
            other => {
                if !self.audit.set_field_value(other, value)? {
                    return Err(unknown_field::<Self>(other));
                }
            }
        }
        Ok(())
    }
}

impl AbstractBaseModel for Article {
    fn audit(&self) -> &AuditFields {
        &self.audit
    }
    fn audit_mut(&mut self) -> &mut AuditFields {
        &mut self.audit
    }
}

impl SlugModel for Article {}
impl UserOwnedModel for Article {}

impl TokenModel for Article {
    fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
    fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }
}

#[async_trait]
impl SavePrep for Article {
    async fn save_prep<S>(store: &S, instances: &mut [Self]) -> CoreResult<()>
    where
        S: ModelStore<Self> + ?Sized,
    {
        assign_tokens(store, instances).await?;
        Self::audit_save_prep(instances)
    }
}

impl SafeDeleteModel for Article {
    fn is_deleted(&self) -> bool {
        self.is_deleted
    }
    fn set_deleted(&mut self, is_deleted: bool) {
        self.is_deleted = is_deleted;
    }
}

impl UrlLink for Article {
    fn link_text_field() -> &'static str {
        "title"
    }
    fn get_absolute_url(&self) -> String {
        format!("/articles/{}", self.id.unwrap_or_default())
    }
    fn get_edit_url(&self) -> String {
        format!("{}/edit", self.get_absolute_url())
    }
    fn get_delete_url(&self) -> String {
        format!("{}/delete", self.get_absolute_url())
    }
}

/// A single-character token model, for exercising a tiny token space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ticket {
    pub id: Option<i64>,
    pub token: Option<String>,
}

impl Ticket {
    pub fn with_token(token: &str) -> Self {
        Self {
            id: None,
            token: Some(token.to_string()),
        }
    }
}

impl Model for Ticket {
    fn table_name() -> &'static str {
        "desk_ticket"
    }
    fn app_label() -> &'static str {
        "desk"
    }
    fn model_name() -> &'static str {
        "ticket"
    }
    fn field_names() -> &'static [&'static str] {
        &["id", "token"]
    }
    fn unique_field_names() -> &'static [&'static str] {
        &["token"]
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
            _ => None,
        }
    }
    fn set_field_value(&mut self, name: &str, value: Value) -> CoreResult<()> {
        match name {
            "id" => self.id = FromValue::from_value(value)?,
            "token" => self.token = FromValue::from_value(value)?,
            _ => return Err(unknown_field::<Self>(name)),
        }
        Ok(())
    }
}

impl TokenModel for Ticket {
    const TOKEN_LENGTH: usize = 1;

    fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
    fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }
}

#[async_trait]
impl SavePrep for Ticket {
    async fn save_prep<S>(store: &S, instances: &mut [Self]) -> CoreResult<()>
    where
        S: ModelStore<Self> + ?Sized,
    {
        assign_tokens(store, instances).await
    }
}

/// A generic tag pointing at any registered model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tag {
    pub id: Option<i64>,
    pub content_type_id: i64,
    pub object_id: i64,
}

impl Model for Tag {
    fn table_name() -> &'static str {
        "blog_tag"
    }
    fn app_label() -> &'static str {
        "blog"
    }
    fn model_name() -> &'static str {
        "tag"
    }
    fn field_names() -> &'static [&'static str] {
        &["id", "content_type_id", "object_id"]
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
            "content_type_id" => Some(self.content_type_id.into()),
            "object_id" => Some(self.object_id.into()),
            _ => None,
        }
    }
    fn set_field_value(&mut self, name: &str, value: Value) -> CoreResult<()> {
        match name {
            "id" => self.id = FromValue::from_value(value)?,
            "content_type_id" => self.content_type_id = FromValue::from_value(value)?,
            "object_id" => self.object_id = FromValue::from_value(value)?,
            _ => return Err(unknown_field::<Self>(name)),
        }
        Ok(())
    }
}

impl SavePrep for Tag {}

impl GenericObject for Tag {
    fn for_object(content_type_id: i64, object_id: i64) -> Self {
        Self {
            id: None,
            content_type_id,
            object_id,
        }
    }
    fn content_type_id(&self) -> i64 {
        self.content_type_id
    }
    fn object_id(&self) -> i64 {
        self.object_id
    }
}
