//! Created/modified timestamps and expiry.

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::Model;

/// Creation and modification timestamps, both defaulting to now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateTimeFields {
    /// When the object was created (UTC).
    pub created_dttm: NaiveDateTime,
    /// When the object was last modified (UTC).
    pub last_modified_dttm: NaiveDateTime,
}

impl Default for DateTimeFields {
    fn default() -> Self {
        let now = Utc::now().naive_utc();
        Self {
            created_dttm: now,
            last_modified_dttm: now,
        }
    }
}

/// A model tracking when it was created and last modified.
pub trait DateTimeTracking: Model {
    /// The model's timestamps.
    fn datetimes(&self) -> &DateTimeFields;

    /// Mutable access to the model's timestamps.
    fn datetimes_mut(&mut self) -> &mut DateTimeFields;

    /// Refreshes `last_modified_dttm` for objects that are already stored.
    fn touch(&mut self) {
        if self.pk().is_some() {
            self.datetimes_mut().last_modified_dttm = Utc::now().naive_utc();
        }
    }

    /// Calls [`Self::touch`] on each instance; use from `SavePrep::save_prep`.
    fn datetime_save_prep(instances: &mut [Self]) {
        for instance in instances.iter_mut() {
            instance.touch();
        }
    }
}

/// A model that can expire.
pub trait Expires {
    /// The UTC time the object expires; `None` never expires.
    fn expires_dttm(&self) -> Option<NaiveDateTime>;

    /// Whether the object has expired as of `now`.
    fn is_expired_at(&self, now: NaiveDateTime) -> bool {
        self.expires_dttm().is_some_and(|expires| now >= expires)
    }

    /// Whether the object has expired.
    fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().naive_utc())
    }
}
