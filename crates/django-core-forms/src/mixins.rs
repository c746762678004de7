//! Reusable form pieces: delete flags, paging and query fields, user bound
//! forms and audit stamping.

use async_trait::async_trait;
use django_core_auth::User;
use django_core_common::error::CoreResult;
use django_core_db::mixins::AbstractBaseModel;
use django_core_db::{save_model, ModelStore, SavePrep, Value};

use crate::fields::{BooleanField, CharFieldStripped, FormFieldDef, IntegerField};
use crate::form::{BaseForm, Form, FormErrors};
use crate::widgets::{HiddenInput, PasswordInput};

// ── Delete ─────────────────────────────────────────────────────────────

/// Adds a hidden `delete` flag to a form.
///
/// When the flag is set the form is always valid (the object is going away,
/// so its other fields don't matter) and [`save`](Self::save) is a no-op.
pub struct DeleteFormMixin<F: Form> {
    form: F,
}

impl<F: Form> DeleteFormMixin<F> {
    pub const DELETE_FIELD: &'static str = "delete";

    pub fn new(mut form: F) -> Self {
        form.base_mut().add_fields([BooleanField::new(Self::DELETE_FIELD)
            .required(false)
            .initial(false)
            .widget(HiddenInput::new())]);
        Self { form }
    }

    pub const fn inner(&self) -> &F {
        &self.form
    }

    pub fn into_inner(self) -> F {
        self.form
    }

    /// `true` once a bound form was submitted with `delete` set.
    pub fn delete_requested(&self) -> bool {
        self.form.cleaned_data().get(Self::DELETE_FIELD) == Some(&Value::Bool(true))
    }

    /// Saves `instance` unless deletion was requested, in which case `None`
    /// is returned and nothing is written.
    pub async fn save<M, S>(&self, store: &S, mut instance: M) -> CoreResult<Option<M>>
    where
        M: SavePrep,
        S: ModelStore<M> + ?Sized,
    {
        if self.delete_requested() {
            return Ok(None);
        }
        save_model(store, &mut instance).await?;
        Ok(Some(instance))
    }

    /// Deletes `instance` by primary key; returns whether a row went away.
    pub async fn delete<M, S>(&self, store: &S, instance: &M) -> CoreResult<bool>
    where
        M: django_core_db::Model,
        S: ModelStore<M> + ?Sized,
    {
        match instance.pk() {
            Some(pk) => Ok(store.delete(&django_core_db::Q::eq("pk", pk)).await? > 0),
            None => Ok(false),
        }
    }
}

#[async_trait]
impl<F: Form> Form for DeleteFormMixin<F> {
    fn base(&self) -> &BaseForm {
        self.form.base()
    }

    fn base_mut(&mut self) -> &mut BaseForm {
        self.form.base_mut()
    }

    async fn clean(&mut self) -> Result<(), FormErrors> {
        self.form.clean().await
    }

    async fn is_valid(&mut self) -> bool {
        let valid = self.form.is_valid().await;
        if self.delete_requested() {
            self.form.base_mut().clear_errors();
            return true;
        }
        valid
    }
}

// ── Paging and query ───────────────────────────────────────────────────

/// Page number `p` (initially 1) and page size `ps` (initially 25).
pub struct PagingFormMixin;

impl PagingFormMixin {
    pub const PAGE_NUM_INITIAL: i64 = 1;
    pub const PAGE_SIZE_INITIAL: i64 = 25;

    pub fn fields() -> Vec<FormFieldDef> {
        vec![
            IntegerField::new("p")
                .label("Page")
                .initial(Self::PAGE_NUM_INITIAL)
                .required(false),
            IntegerField::new("ps")
                .label("Page Size")
                .initial(Self::PAGE_SIZE_INITIAL)
                .required(false),
        ]
    }

    /// The cleaned page number, if one was given.
    pub fn page_num(form: &dyn Form) -> Option<i64> {
        form.cleaned_data().get("p").and_then(Value::as_i64)
    }

    /// The cleaned page size, if one was given.
    pub fn page_size(form: &dyn Form) -> Option<i64> {
        form.cleaned_data().get("ps").and_then(Value::as_i64)
    }
}

/// An optional free text query field `q`.
pub struct QueryFormMixin;

impl QueryFormMixin {
    pub fn fields() -> Vec<FormFieldDef> {
        vec![CharFieldStripped::new("q").required(false)]
    }

    /// The stripped query; `None` when blank.
    pub fn query(form: &dyn Form) -> Option<&str> {
        form.cleaned_data()
            .get("q")
            .and_then(Value::as_str)
            .filter(|q| !q.is_empty())
    }
}

// ── Users ──────────────────────────────────────────────────────────────

/// A form that always carries the user it acts for.
pub trait UserFormMixin {
    fn user(&self) -> &User;
}

/// Makes the user re-enter their password, for flows such as changing an
/// email address or password.
pub struct UserAuthorizationRequiredForm {
    base: BaseForm,
    user: User,
}

impl UserAuthorizationRequiredForm {
    pub const PASSWORD_INCORRECT: &'static str = "password_incorrect";

    pub fn new(user: User) -> Self {
        Self::with_fields(user, Vec::new())
    }

    /// Adds `fields` after the password field.
    pub fn with_fields(user: User, fields: Vec<FormFieldDef>) -> Self {
        let mut base = BaseForm::new(vec![CharFieldStripped::new("password")
            .max_length(50)
            .widget(PasswordInput::new())
            .error_message(
                Self::PASSWORD_INCORRECT,
                "Your old password was entered incorrectly. Please enter it again.",
            )]);
        base.add_fields(fields);
        Self { base, user }
    }
}

impl UserFormMixin for UserAuthorizationRequiredForm {
    fn user(&self) -> &User {
        &self.user
    }
}

#[async_trait]
impl Form for UserAuthorizationRequiredForm {
    fn base(&self) -> &BaseForm {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseForm {
        &mut self.base
    }

    async fn clean(&mut self) -> Result<(), FormErrors> {
        let Some(password) = self.base.cleaned_value("password").and_then(Value::as_str) else {
            return Ok(());
        };

        let matches = match self.user.check_password(password).await {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!(error = %e, user_id = ?self.user.id, "password check failed");
                false
            }
        };
        if matches {
            return Ok(());
        }

        let message = self
            .base
            .field("password")
            .map(|f| f.message(Self::PASSWORD_INCORRECT, ""))
            .unwrap_or_default();
        Err(FormErrors::from([("password".to_string(), vec![message])]))
    }
}

// ── Audit ──────────────────────────────────────────────────────────────

/// Stamps a new object with the user creating it, as both the creating
/// and the last modifying user.
#[derive(Debug, Clone)]
pub struct AddFormAuditMixin {
    user: User,
}

impl AddFormAuditMixin {
    pub const fn new(user: User) -> Self {
        Self { user }
    }

    pub fn apply<M: AbstractBaseModel>(&self, instance: &mut M) {
        let audit = instance.audit_mut();
        audit.created_user_id = self.user.id;
        audit.last_modified_user_id = self.user.id;
    }

    /// Stamps and saves `instance`.
    pub async fn save<M, S>(&self, store: &S, instance: &mut M) -> CoreResult<()>
    where
        M: AbstractBaseModel + SavePrep,
        S: ModelStore<M> + ?Sized,
    {
        self.apply(instance);
        save_model(store, instance).await
    }
}

impl UserFormMixin for AddFormAuditMixin {
    fn user(&self) -> &User {
        &self.user
    }
}

/// Stamps an edited object with the user editing it.
#[derive(Debug, Clone)]
pub struct EditFormAuditMixin {
    user: User,
}

impl EditFormAuditMixin {
    pub const fn new(user: User) -> Self {
        Self { user }
    }

    pub fn apply<M: AbstractBaseModel>(&self, instance: &mut M) {
        instance.audit_mut().last_modified_user_id = self.user.id;
    }

    /// Stamps and saves `instance`.
    pub async fn save<M, S>(&self, store: &S, instance: &mut M) -> CoreResult<()>
    where
        M: AbstractBaseModel + SavePrep,
        S: ModelStore<M> + ?Sized,
    {
        self.apply(instance);
        save_model(store, instance).await
    }
}

impl UserFormMixin for EditFormAuditMixin {
    fn user(&self) -> &User {
        &self.user
    }
}
