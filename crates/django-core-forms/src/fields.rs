//! Form field definitions and cleaning.
//!
//! A [`FormFieldDef`] pairs a [`FormFieldType`] with its widget, label and
//! error messages. [`clean_field_value`] turns the raw value a widget read
//! from the request into a typed [`Value`] or a list of error messages.
//!
//! The unit structs ([`CharFieldStripped`], [`IntegerField`], ...) build
//! definitions with the right type and widget:
//!
//! ```
//! use django_core_forms::{CommaSeparatedListField, FormFieldType};
//!
//! let field = CommaSeparatedListField::new("tags").max_list_length(5);
//! assert!(matches!(
//!     field.field_type,
//!     FormFieldType::CommaSeparatedList { max_list_length: Some(5) }
//! ));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use django_core_db::Value;

use crate::widgets::{
    split_comma_list, CheckboxInput, CommaSeparatedListWidget, Html5DateTimeInput, TextInput,
    Widget,
};

/// The message for a list containing anything but whole numbers.
pub const NOT_WHOLE_NUMBERS: &str = "All values in list must be whole numbers.";

/// How a field parses and validates its raw value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormFieldType {
    /// Text with surrounding whitespace stripped.
    CharStripped {
        min_length: Option<usize>,
        max_length: Option<usize>,
    },
    /// A comma separated string, cleaned to a list of trimmed strings.
    CommaSeparatedList { max_list_length: Option<usize> },
    /// A comma separated string, cleaned to a list of integers.
    CommaSeparatedIntegerList { max_list_length: Option<usize> },
    Integer {
        min_value: Option<i64>,
        max_value: Option<i64>,
    },
    Boolean,
    /// A date and time; a bare date means midnight.
    DateTime,
}

/// A form field.
#[derive(Clone)]
pub struct FormFieldDef {
    /// The field name, also its HTML `name`.
    pub name: String,
    pub field_type: FormFieldType,
    pub required: bool,
    /// Value shown by an unbound form.
    pub initial: Option<Value>,
    pub label: String,
    pub help_text: String,
    pub widget: Arc<dyn Widget>,
    /// Overrides for the default messages, keyed by error code.
    pub error_messages: HashMap<String, String>,
}

impl fmt::Debug for FormFieldDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormFieldDef")
            .field("name", &self.name)
            .field("field_type", &self.field_type)
            .field("required", &self.required)
            .field("widget", &self.widget.widget_type())
            .finish_non_exhaustive()
    }
}

impl FormFieldDef {
    /// A required field using the default widget for `field_type`.
    pub fn new(name: impl Into<String>, field_type: FormFieldType) -> Self {
        let name = name.into();
        let label = default_label(&name);
        Self {
            widget: default_widget_for_field_type(&field_type),
            name,
            field_type,
            required: true,
            initial: None,
            label,
            help_text: String::new(),
            error_messages: HashMap::new(),
        }
    }

    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    #[must_use]
    pub fn initial(mut self, value: impl Into<Value>) -> Self {
        self.initial = Some(value.into());
        self
    }

    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    #[must_use]
    pub fn help_text(mut self, text: impl Into<String>) -> Self {
        self.help_text = text.into();
        self
    }

    #[must_use]
    pub fn widget(mut self, widget: impl Widget + 'static) -> Self {
        self.widget = Arc::new(widget);
        self
    }

    #[must_use]
    pub fn error_message(mut self, code: impl Into<String>, message: impl Into<String>) -> Self {
        self.error_messages.insert(code.into(), message.into());
        self
    }

    /// Sets `max_length` on char fields; ignored for other types.
    #[must_use]
    pub fn max_length(mut self, max: usize) -> Self {
        if let FormFieldType::CharStripped { max_length, .. } = &mut self.field_type {
            *max_length = Some(max);
        }
        self
    }

    /// Sets `min_length` on char fields; ignored for other types.
    #[must_use]
    pub fn min_length(mut self, min: usize) -> Self {
        if let FormFieldType::CharStripped { min_length, .. } = &mut self.field_type {
            *min_length = Some(min);
        }
        self
    }

    /// Caps the number of items in a list field; ignored for other types.
    #[must_use]
    pub fn max_list_length(mut self, max: usize) -> Self {
        match &mut self.field_type {
            FormFieldType::CommaSeparatedList { max_list_length }
            | FormFieldType::CommaSeparatedIntegerList { max_list_length } => {
                *max_list_length = Some(max);
            }
            _ => {}
        }
        self
    }

    /// The message for `code`, or `default` when not overridden.
    pub fn message(&self, code: &str, default: impl Into<String>) -> String {
        self.error_messages
            .get(code)
            .cloned()
            .unwrap_or_else(|| default.into())
    }
}

fn default_label(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let mut chars = spaced.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// The widget a field type renders with unless overridden.
pub fn default_widget_for_field_type(field_type: &FormFieldType) -> Arc<dyn Widget> {
    match field_type {
        FormFieldType::CharStripped { .. } | FormFieldType::Integer { .. } => {
            Arc::new(TextInput::new())
        }
        FormFieldType::CommaSeparatedList { .. }
        | FormFieldType::CommaSeparatedIntegerList { .. } => {
            Arc::new(CommaSeparatedListWidget::new())
        }
        FormFieldType::Boolean => Arc::new(CheckboxInput::new()),
        FormFieldType::DateTime => Arc::new(Html5DateTimeInput::new()),
    }
}

// ── Field constructors ─────────────────────────────────────────────────

/// A char field that strips surrounding whitespace before validating.
pub struct CharFieldStripped;

impl CharFieldStripped {
    pub fn new(name: impl Into<String>) -> FormFieldDef {
        FormFieldDef::new(
            name,
            FormFieldType::CharStripped {
                min_length: None,
                max_length: None,
            },
        )
    }
}

/// Takes `"a, b,c"` and cleans it to `["a", "b", "c"]`.
pub struct CommaSeparatedListField;

impl CommaSeparatedListField {
    pub fn new(name: impl Into<String>) -> FormFieldDef {
        FormFieldDef::new(
            name,
            FormFieldType::CommaSeparatedList {
                max_list_length: None,
            },
        )
    }
}

/// Takes `"1, 2,3"` and cleans it to `[1, 2, 3]`.
pub struct CommaSeparatedIntegerListField;

impl CommaSeparatedIntegerListField {
    pub fn new(name: impl Into<String>) -> FormFieldDef {
        FormFieldDef::new(
            name,
            FormFieldType::CommaSeparatedIntegerList {
                max_list_length: None,
            },
        )
    }
}

pub struct IntegerField;

impl IntegerField {
    pub fn new(name: impl Into<String>) -> FormFieldDef {
        FormFieldDef::new(
            name,
            FormFieldType::Integer {
                min_value: None,
                max_value: None,
            },
        )
    }

    /// An integer field bounded on both sides.
    pub fn bounded(name: impl Into<String>, min: Option<i64>, max: Option<i64>) -> FormFieldDef {
        FormFieldDef::new(
            name,
            FormFieldType::Integer {
                min_value: min,
                max_value: max,
            },
        )
    }
}

pub struct BooleanField;

impl BooleanField {
    pub fn new(name: impl Into<String>) -> FormFieldDef {
        FormFieldDef::new(name, FormFieldType::Boolean)
    }
}

pub struct DateTimeField;

impl DateTimeField {
    pub fn new(name: impl Into<String>) -> FormFieldDef {
        FormFieldDef::new(name, FormFieldType::DateTime)
    }
}

// ── Cleaning ───────────────────────────────────────────────────────────

fn is_empty_raw(raw: Option<&Value>) -> bool {
    match raw {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::List(items)) => items.is_empty(),
        Some(_) => false,
    }
}

/// The value of an empty, optional field.
fn empty_value(field_type: &FormFieldType) -> Value {
    match field_type {
        FormFieldType::CharStripped { .. } => Value::from(""),
        FormFieldType::CommaSeparatedList { .. }
        | FormFieldType::CommaSeparatedIntegerList { .. } => Value::List(Vec::new()),
        FormFieldType::Boolean => Value::Bool(false),
        FormFieldType::Integer { .. } | FormFieldType::DateTime => Value::Null,
    }
}

fn raw_to_list(raw: &Value) -> Vec<String> {
    match raw {
        Value::List(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.trim().to_string(),
                other => other.to_string(),
            })
            .filter(|item| !item.is_empty())
            .collect(),
        Value::String(s) => split_comma_list(s),
        other => split_comma_list(&other.to_string()),
    }
}

fn check_list_length(field: &FormFieldDef, max: Option<usize>, len: usize) -> Result<(), String> {
    match max {
        Some(max) if len > max => Err(field.message(
            "max_list_length",
            format!("Ensure this list has at most {max} items (it has {len})."),
        )),
        _ => Ok(()),
    }
}

fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
    ];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Validates and converts a raw widget value.
///
/// Required fields reject empty input; optional empty input becomes the
/// type's empty value (`""`, `[]`, `false` or null).
pub fn clean_field_value(field: &FormFieldDef, raw: Option<&Value>) -> Result<Value, Vec<String>> {
    if field.field_type == FormFieldType::Boolean {
        let checked = match raw {
            Some(Value::String(s)) => {
                !matches!(s.trim().to_ascii_lowercase().as_str(), "" | "false" | "0" | "off")
            }
            Some(other) => other.is_truthy(),
            None => false,
        };
        if field.required && !checked {
            return Err(vec![field.message("required", "This field is required.")]);
        }
        return Ok(Value::Bool(checked));
    }

    if is_empty_raw(raw) {
        if field.required {
            return Err(vec![field.message("required", "This field is required.")]);
        }
        return Ok(empty_value(&field.field_type));
    }
    let Some(raw) = raw else {
        return Ok(empty_value(&field.field_type));
    };

    let mut errors = Vec::new();
    let value = match &field.field_type {
        FormFieldType::CharStripped {
            min_length,
            max_length,
        } => {
            let text = match raw {
                Value::String(s) => s.trim().to_string(),
                other => other.to_string().trim().to_string(),
            };
            let len = text.chars().count();
            if let Some(min) = min_length.filter(|min| len < *min) {
                errors.push(field.message(
                    "min_length",
                    format!("Ensure this value has at least {min} characters (it has {len})."),
                ));
            }
            if let Some(max) = max_length.filter(|max| len > *max) {
                errors.push(field.message(
                    "max_length",
                    format!("Ensure this value has at most {max} characters (it has {len})."),
                ));
            }
            Value::String(text)
        }

        FormFieldType::CommaSeparatedList { max_list_length } => {
            let items = raw_to_list(raw);
            if let Err(e) = check_list_length(field, *max_list_length, items.len()) {
                errors.push(e);
            }
            Value::List(items.into_iter().map(Value::String).collect())
        }

        FormFieldType::CommaSeparatedIntegerList { max_list_length } => {
            let items = raw_to_list(raw);
            if let Err(e) = check_list_length(field, *max_list_length, items.len()) {
                errors.push(e);
            }
            match items
                .iter()
                .map(|item| item.parse::<i64>())
                .collect::<Result<Vec<_>, _>>()
            {
                Ok(numbers) => Value::List(numbers.into_iter().map(Value::Int).collect()),
                Err(_) => {
                    errors.push(field.message("invalid", NOT_WHOLE_NUMBERS));
                    Value::Null
                }
            }
        }

        FormFieldType::Integer {
            min_value,
            max_value,
        } => {
            let parsed = match raw {
                Value::Int(n) => Some(*n),
                Value::String(s) => s.trim().parse::<i64>().ok(),
                _ => None,
            };
            match parsed {
                Some(n) => {
                    if let Some(min) = min_value.filter(|min| n < *min) {
                        errors.push(field.message(
                            "min_value",
                            format!("Ensure this value is greater than or equal to {min}."),
                        ));
                    }
                    if let Some(max) = max_value.filter(|max| n > *max) {
                        errors.push(field.message(
                            "max_value",
                            format!("Ensure this value is less than or equal to {max}."),
                        ));
                    }
                    Value::Int(n)
                }
                None => {
                    errors.push(field.message("invalid", "Enter a whole number."));
                    Value::Null
                }
            }
        }

        FormFieldType::DateTime => match raw {
            Value::DateTime(dt) => Value::DateTime(*dt),
            other => match parse_datetime(other.to_string().trim()) {
                Some(dt) => Value::DateTime(dt),
                None => {
                    errors.push(field.message("invalid", "Enter a valid date/time."));
                    Value::Null
                }
            },
        },

        FormFieldType::Boolean => Value::Bool(raw.is_truthy()),
    };

    if errors.is_empty() {
        Ok(value)
    } else {
        Err(errors)
    }
}
