//! Admin configuration and permission policies.
//!
//! [`ModelAdmin`] holds what the admin shows for a model; [`AdminPolicy`]
//! decides what a user may do with it. [`ReadOnlyModelAdmin`] is the policy
//! for models that must only ever be inspected.

use std::marker::PhantomData;

use django_core_db::{Model, TokenAuthorization};
use django_core_http::RequestUser;
use serde::{Deserialize, Serialize};

/// The bulk action every admin offers unless removed.
pub const DELETE_SELECTED: &str = "delete_selected";

/// How a model is displayed in the admin.
///
/// ```
/// use django_core_views::admin::ModelAdmin;
///
/// let admin = ModelAdmin::new("blog", "article")
///     .list_display(["title", "author"])
///     .readonly_fields(["created_dttm"]);
/// assert_eq!(admin.action_names, vec!["delete_selected"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelAdmin {
    pub app_label: String,
    pub model_name: String,
    /// Fields shown in the change list.
    pub list_display: Vec<String>,
    /// Fields shown but not editable on the change form.
    pub readonly_fields: Vec<String>,
    /// Bulk actions offered on the change list.
    pub action_names: Vec<String>,
}

impl ModelAdmin {
    pub fn new(app_label: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            app_label: app_label.into(),
            model_name: model_name.into(),
            list_display: vec!["__str__".to_string()],
            readonly_fields: Vec::new(),
            action_names: vec![DELETE_SELECTED.to_string()],
        }
    }

    pub fn for_model<M: Model>() -> Self {
        Self::new(M::app_label(), M::model_name())
    }

    #[must_use]
    pub fn list_display<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.list_display = fields.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn readonly_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.readonly_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn actions<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.action_names = actions.into_iter().map(Into::into).collect();
        self
    }
}

/// What staff may do with a model in the admin.
pub trait AdminPolicy: Send + Sync {
    fn model_admin(&self) -> &ModelAdmin;

    fn has_view_permission(&self, user: &RequestUser) -> bool {
        user.is_authenticated() && user.is_staff
    }

    fn has_add_permission(&self, user: &RequestUser) -> bool {
        self.has_view_permission(user)
    }

    fn has_change_permission(&self, user: &RequestUser) -> bool {
        self.has_view_permission(user)
    }

    fn has_delete_permission(&self, user: &RequestUser) -> bool {
        self.has_view_permission(user)
    }

    fn get_readonly_fields(&self) -> Vec<String> {
        self.model_admin().readonly_fields.clone()
    }

    fn get_actions(&self) -> Vec<String> {
        self.model_admin().action_names.clone()
    }
}

impl AdminPolicy for ModelAdmin {
    fn model_admin(&self) -> &ModelAdmin {
        self
    }
}

// ── ReadOnlyModelAdmin ──────────────────────────────────────────────

/// An admin that can list and show `M` but never add, edit or delete it.
///
/// Every field of the model is read-only (declared read-only fields first,
/// in their order) and the `delete_selected` action is removed.
#[derive(Debug, Clone)]
pub struct ReadOnlyModelAdmin<M> {
    admin: ModelAdmin,
    model: PhantomData<fn() -> M>,
}

impl<M: Model> ReadOnlyModelAdmin<M> {
    pub fn new() -> Self {
        Self::from_admin(ModelAdmin::for_model::<M>())
    }

    pub const fn from_admin(admin: ModelAdmin) -> Self {
        Self {
            admin,
            model: PhantomData,
        }
    }
}

impl<M: Model> Default for ReadOnlyModelAdmin<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Model> AdminPolicy for ReadOnlyModelAdmin<M> {
    fn model_admin(&self) -> &ModelAdmin {
        &self.admin
    }

    fn has_add_permission(&self, _user: &RequestUser) -> bool {
        false
    }

    fn has_delete_permission(&self, _user: &RequestUser) -> bool {
        false
    }

    fn get_readonly_fields(&self) -> Vec<String> {
        let mut fields = self.admin.readonly_fields.clone();
        for name in M::field_names() {
            if !fields.iter().any(|f| f == name) {
                fields.push((*name).to_string());
            }
        }
        fields
    }

    fn get_actions(&self) -> Vec<String> {
        self.admin
            .action_names
            .iter()
            .filter(|action| *action != DELETE_SELECTED)
            .cloned()
            .collect()
    }
}

/// The admin for [`TokenAuthorization`].
pub fn token_authorization_admin() -> ModelAdmin {
    let list_display = [
        "id",
        "reason",
        "user",
        "token",
        "email_address",
        "created_user",
        "expires",
    ];
    ModelAdmin::for_model::<TokenAuthorization>()
        .list_display(list_display)
        .readonly_fields(
            list_display
                .iter()
                .copied()
                .chain(["email_sent", "text"]),
        )
}
