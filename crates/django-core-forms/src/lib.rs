//! # django-core-forms
//!
//! Form fields, widgets and reusable form mixins.
//!
//! A form is a [`BaseForm`] holding [`FormFieldDef`]s. Binding it to a
//! [`QueryDict`](django_core_http::QueryDict) reads each field's raw value
//! through its widget; `is_valid` then cleans every field and runs the
//! form's async [`Form::clean`] hook.

pub mod fields;
pub mod form;
pub mod mixins;
pub mod widgets;

pub use fields::{
    BooleanField, CharFieldStripped, CommaSeparatedIntegerListField, CommaSeparatedListField,
    DateTimeField, FormFieldDef, FormFieldType, IntegerField,
};
pub use form::{BaseForm, Form, FormErrors, NON_FIELD_ERRORS};
pub use mixins::{
    AddFormAuditMixin, DeleteFormMixin, EditFormAuditMixin, PagingFormMixin, QueryFormMixin,
    UserAuthorizationRequiredForm, UserFormMixin,
};
pub use widgets::{
    CheckboxInput, CommaSeparatedListWidget, HiddenInput, Html5DateInput, Html5DateTimeInput,
    PasswordInput, ReadonlyWidget, TextInput, Widget, WidgetType,
};
