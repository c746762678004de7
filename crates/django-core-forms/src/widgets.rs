//! Widgets render form fields as HTML and read their raw values back out
//! of submitted data.

use std::collections::HashMap;
use std::fmt;

use django_core_common::utils::text::escape_html;
use django_core_db::Value;
use django_core_http::QueryDict;

/// Identifies a built-in widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetType {
    TextInput,
    HiddenInput,
    PasswordInput,
    CheckboxInput,
    Html5DateInput,
    Html5DateTimeInput,
    ReadonlyWidget,
    CommaSeparatedListWidget,
}

impl fmt::Display for WidgetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// An HTML form widget.
///
/// Implementors provide `widget_type`, `input_type` and `attrs`; rendering and
/// data extraction have defaults that suit `<input>` elements.
pub trait Widget: Send + Sync + fmt::Debug {
    fn widget_type(&self) -> WidgetType;

    /// The `type` attribute of the rendered `<input>`.
    fn input_type(&self) -> &'static str;

    /// Attributes configured on the widget itself.
    fn attrs(&self) -> &HashMap<String, String>;

    /// Converts a value to the text shown in the `value` attribute.
    fn format_value(&self, value: Option<&Value>) -> Option<String> {
        value.and_then(display_value)
    }

    /// Renders the widget. `attrs` override the widget's own attributes.
    fn render(&self, name: &str, value: Option<&Value>, attrs: &HashMap<String, String>) -> String {
        let mut merged = self.attrs().clone();
        merged.extend(attrs.iter().map(|(k, v)| (k.clone(), v.clone())));
        render_input(self.input_type(), name, self.format_value(value).as_deref(), &merged)
    }

    /// Reads this widget's raw value from submitted data.
    fn value_from_data(&self, data: &QueryDict, name: &str) -> Option<Value> {
        data.get(name).map(Value::from)
    }

    fn id_for_label(&self, id: &str) -> String {
        id.to_string()
    }
}

/// Text for a value; `None` for null.
pub fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::DateTime(dt) => Some(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
        Value::List(items) => Some(
            items
                .iter()
                .filter_map(display_value)
                .collect::<Vec<_>>()
                .join(","),
        ),
        other => Some(other.to_string()),
    }
}

/// Formats attributes as ` key="value"` pairs in key order.
fn render_attrs(attrs: &HashMap<String, String>) -> String {
    let mut parts: Vec<String> = attrs
        .iter()
        .map(|(k, v)| format!(r#" {k}="{}""#, escape_html(v)))
        .collect();
    parts.sort();
    parts.concat()
}

fn render_input(
    input_type: &str,
    name: &str,
    value: Option<&str>,
    attrs: &HashMap<String, String>,
) -> String {
    let value_attr = value
        .filter(|v| !v.is_empty())
        .map(|v| format!(r#" value="{}""#, escape_html(v)))
        .unwrap_or_default();
    format!(
        r#"<input type="{input_type}" name="{name}"{value_attr}{} />"#,
        render_attrs(attrs)
    )
}

macro_rules! input_widget {
    ($(#[$meta:meta])* $name:ident, $input_type:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default)]
        pub struct $name {
            pub attrs: HashMap<String, String>,
        }

        impl $name {
            pub fn new() -> Self {
                Self::default()
            }

            /// Adds an attribute rendered on every call.
            #[must_use]
            pub fn attr(mut self, name: &str, value: &str) -> Self {
                self.attrs.insert(name.to_string(), value.to_string());
                self
            }
        }

        impl Widget for $name {
            fn widget_type(&self) -> WidgetType {
                WidgetType::$name
            }

            fn input_type(&self) -> &'static str {
                $input_type
            }

            fn attrs(&self) -> &HashMap<String, String> {
                &self.attrs
            }
        }
    };
}

input_widget!(
    /// `<input type="text">`.
    TextInput,
    "text"
);

input_widget!(
    /// `<input type="hidden">`.
    HiddenInput,
    "hidden"
);

/// `<input type="password">`. The value is never rendered back.
#[derive(Debug, Clone, Default)]
pub struct PasswordInput {
    pub attrs: HashMap<String, String>,
}

impl PasswordInput {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Widget for PasswordInput {
    fn widget_type(&self) -> WidgetType {
        WidgetType::PasswordInput
    }

    fn input_type(&self) -> &'static str {
        "password"
    }

    fn attrs(&self) -> &HashMap<String, String> {
        &self.attrs
    }

    fn format_value(&self, _value: Option<&Value>) -> Option<String> {
        None
    }
}

/// `<input type="checkbox">`, checked when the value is truthy.
#[derive(Debug, Clone, Default)]
pub struct CheckboxInput {
    pub attrs: HashMap<String, String>,
}

impl CheckboxInput {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Widget for CheckboxInput {
    fn widget_type(&self) -> WidgetType {
        WidgetType::CheckboxInput
    }

    fn input_type(&self) -> &'static str {
        "checkbox"
    }

    fn attrs(&self) -> &HashMap<String, String> {
        &self.attrs
    }

    fn render(&self, name: &str, value: Option<&Value>, attrs: &HashMap<String, String>) -> String {
        let mut merged = self.attrs.clone();
        merged.extend(attrs.iter().map(|(k, v)| (k.clone(), v.clone())));
        if value.is_some_and(Value::is_truthy) {
            merged.insert("checked".to_string(), "checked".to_string());
        }
        render_input("checkbox", name, None, &merged)
    }

    /// Absent means unchecked; "false", "0" and "off" also read as unchecked.
    fn value_from_data(&self, data: &QueryDict, name: &str) -> Option<Value> {
        let checked = data.get(name).is_some_and(|v| {
            !matches!(v.to_ascii_lowercase().as_str(), "false" | "0" | "off")
        });
        Some(Value::Bool(checked))
    }
}

/// An HTML5 date input. Datetimes render using `date_format`.
#[derive(Debug, Clone)]
pub struct Html5DateInput {
    pub date_format: String,
    pub attrs: HashMap<String, String>,
}

impl Default for Html5DateInput {
    fn default() -> Self {
        Self {
            date_format: "%Y-%m-%d".to_string(),
            attrs: HashMap::new(),
        }
    }
}

impl Html5DateInput {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_format(mut self, date_format: &str) -> Self {
        self.date_format = date_format.to_string();
        self
    }
}

impl Widget for Html5DateInput {
    fn widget_type(&self) -> WidgetType {
        WidgetType::Html5DateInput
    }

    fn input_type(&self) -> &'static str {
        "date"
    }

    fn attrs(&self) -> &HashMap<String, String> {
        &self.attrs
    }

    fn format_value(&self, value: Option<&Value>) -> Option<String> {
        match value {
            Some(Value::DateTime(dt)) if !self.date_format.is_empty() => {
                Some(dt.format(&self.date_format).to_string())
            }
            other => other.and_then(display_value),
        }
    }
}

/// An HTML5 datetime input, `%Y-%m-%d %H:%M:%S` by default.
#[derive(Debug, Clone)]
pub struct Html5DateTimeInput {
    pub date_format: String,
    pub attrs: HashMap<String, String>,
}

impl Default for Html5DateTimeInput {
    fn default() -> Self {
        Self {
            date_format: "%Y-%m-%d %H:%M:%S".to_string(),
            attrs: HashMap::new(),
        }
    }
}

impl Html5DateTimeInput {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_format(mut self, date_format: &str) -> Self {
        self.date_format = date_format.to_string();
        self
    }
}

impl Widget for Html5DateTimeInput {
    fn widget_type(&self) -> WidgetType {
        WidgetType::Html5DateTimeInput
    }

    fn input_type(&self) -> &'static str {
        "datetime"
    }

    fn attrs(&self) -> &HashMap<String, String> {
        &self.attrs
    }

    fn format_value(&self, value: Option<&Value>) -> Option<String> {
        match value {
            Some(Value::DateTime(dt)) => Some(dt.format(&self.date_format).to_string()),
            other => other.and_then(display_value),
        }
    }
}

/// A text input that always renders `readonly`.
///
/// A `value` attribute on the widget replaces whatever value is displayed.
#[derive(Debug, Clone, Default)]
pub struct ReadonlyWidget {
    pub attrs: HashMap<String, String>,
}

impl ReadonlyWidget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows `value` instead of the field's value.
    #[must_use]
    pub fn display(mut self, value: &str) -> Self {
        self.attrs.insert("value".to_string(), value.to_string());
        self
    }
}

impl Widget for ReadonlyWidget {
    fn widget_type(&self) -> WidgetType {
        WidgetType::ReadonlyWidget
    }

    fn input_type(&self) -> &'static str {
        "text"
    }

    fn attrs(&self) -> &HashMap<String, String> {
        &self.attrs
    }

    fn render(&self, name: &str, value: Option<&Value>, attrs: &HashMap<String, String>) -> String {
        let mut merged = self.attrs.clone();
        merged
            .entry("readonly".to_string())
            .or_insert_with(|| "readonly".to_string());
        let display = merged
            .remove("value")
            .or_else(|| self.format_value(value));
        merged.extend(attrs.iter().map(|(k, v)| (k.clone(), v.clone())));
        render_input("text", name, display.as_deref(), &merged)
    }
}

/// A text input for lists, shown as `a, b, c` and read back as a list.
#[derive(Debug, Clone, Default)]
pub struct CommaSeparatedListWidget {
    pub attrs: HashMap<String, String>,
}

impl CommaSeparatedListWidget {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Widget for CommaSeparatedListWidget {
    fn widget_type(&self) -> WidgetType {
        WidgetType::CommaSeparatedListWidget
    }

    fn input_type(&self) -> &'static str {
        "text"
    }

    fn attrs(&self) -> &HashMap<String, String> {
        &self.attrs
    }

    fn format_value(&self, value: Option<&Value>) -> Option<String> {
        match value {
            Some(Value::List(items)) => Some(
                items
                    .iter()
                    .filter_map(display_value)
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            other => other.and_then(display_value),
        }
    }

    /// Splits on commas, dropping blank items. Empty input stays a string.
    fn value_from_data(&self, data: &QueryDict, name: &str) -> Option<Value> {
        data.get(name).map(|raw| {
            if raw.is_empty() {
                Value::from(raw)
            } else {
                Value::List(split_comma_list(raw).into_iter().map(Value::String).collect())
            }
        })
    }
}

/// `"a, b,,c "` becomes `["a", "b", "c"]`.
pub fn split_comma_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}
