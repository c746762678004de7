//! Audit fields shared by most models.

use chrono::{NaiveDateTime, Utc};
use django_core_common::error::CoreResult;
use serde::{Deserialize, Serialize};

use crate::model::Model;
use crate::value::{FromValue, Value};

/// Who created and last modified an object, and when.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditFields {
    /// The user who created the object.
    pub created_user_id: Option<i64>,
    /// When the object was created (UTC).
    pub created_dttm: Option<NaiveDateTime>,
    /// The user who last modified the object.
    pub last_modified_user_id: Option<i64>,
    /// When the object was last modified (UTC).
    pub last_modified_dttm: Option<NaiveDateTime>,
}

impl AuditFields {
    /// Names of the audit fields as seen by queries.
    pub const FIELD_NAMES: [&'static str; 4] = [
        "created_user_id",
        "created_dttm",
        "last_modified_user_id",
        "last_modified_dttm",
    ];

    /// Audit fields for a new object created by `user_id`.
    pub const fn created_by(user_id: i64) -> Self {
        Self {
            created_user_id: Some(user_id),
            created_dttm: None,
            last_modified_user_id: None,
            last_modified_dttm: None,
        }
    }

    /// Returns the value of an audit field, `None` for any other name.
    pub fn field_value(&self, name: &str) -> Option<Value> {
        match name {
            "created_user_id" => Some(self.created_user_id.into()),
            "created_dttm" => Some(self.created_dttm.into()),
            "last_modified_user_id" => Some(self.last_modified_user_id.into()),
            "last_modified_dttm" => Some(self.last_modified_dttm.into()),
            _ => None,
        }
    }

    /// Sets an audit field. Returns `Ok(false)` when `name` is not one.
    pub fn set_field_value(&mut self, name: &str, value: Value) -> CoreResult<bool> {
        match name {
            "created_user_id" => self.created_user_id = FromValue::from_value(value)?,
            "created_dttm" => self.created_dttm = FromValue::from_value(value)?,
            "last_modified_user_id" => self.last_modified_user_id = FromValue::from_value(value)?,
            "last_modified_dttm" => self.last_modified_dttm = FromValue::from_value(value)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Stamps the modification time and fills in unset creation data.
    pub fn prep(&mut self, now: NaiveDateTime) {
        self.last_modified_dttm = Some(now);
        if self.created_dttm.is_none() {
            self.created_dttm = Some(now);
        }
        if self.created_user_id.is_some() && self.last_modified_user_id.is_none() {
            self.last_modified_user_id = self.created_user_id;
        }
    }
}

/// Base behavior for models carrying [`AuditFields`].
pub trait AbstractBaseModel: Model {
    /// The model's audit fields.
    fn audit(&self) -> &AuditFields;

    /// Mutable access to the model's audit fields.
    fn audit_mut(&mut self) -> &mut AuditFields;

    /// Common pre-save processing for one or many instances.
    ///
    /// Sets `last_modified_dttm` to now, defaults `created_dttm`, copies the
    /// creating user to `last_modified_user_id` when unset, and strips every
    /// char field.
    fn audit_save_prep(instances: &mut [Self]) -> CoreResult<()> {
        let now = Utc::now().naive_utc();
        for instance in instances.iter_mut() {
            instance.audit_mut().prep(now);
            instance.strip_fields()?;
        }
        Ok(())
    }

    /// Returns an unsaved copy of this object.
    ///
    /// The primary key, unique fields and anything in `exclude_fields` are
    /// reset to their defaults; both timestamps are reset to now and the last
    /// modifying user becomes the creating user. `overrides` are applied last.
    fn copy(&self, exclude_fields: &[&str], overrides: Vec<(&str, Value)>) -> CoreResult<Self> {
        let mut instance = self.clone();
        instance.set_pk(None);

        let now = Utc::now().naive_utc();
        {
            let audit = instance.audit_mut();
            audit.last_modified_user_id = audit.created_user_id;
            audit.created_dttm = Some(now);
            audit.last_modified_dttm = Some(now);
        }

        let mut reset: Vec<&str> = exclude_fields.to_vec();
        reset.extend(Self::unique_field_names().iter().copied());
        reset.retain(|f| *f != "created_dttm" && *f != "last_modified_dttm");
        reset.sort_unstable();
        reset.dedup();
        for field in reset {
            instance.set_field_value(field, Self::field_default(field))?;
        }

        for (field, value) in overrides {
            instance.set_field_value(field, value)?;
        }
        Ok(instance)
    }
}
