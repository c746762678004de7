//! The [`Form`] trait and [`BaseForm`].
//!
//! Concrete forms wrap a [`BaseForm`] and expose it through [`Form::base`];
//! every other method has a default built on top of it. Cross-field checks
//! go in the async [`Form::clean`] hook, which may hit the database.

use std::collections::HashMap;

use async_trait::async_trait;
use django_core_db::Value;
use django_core_http::QueryDict;

use crate::fields::{clean_field_value, FormFieldDef};

/// Field name to error messages.
pub type FormErrors = HashMap<String, Vec<String>>;

/// The error key for errors not tied to one field.
pub const NON_FIELD_ERRORS: &str = "__all__";

/// A form.
#[async_trait]
pub trait Form: Send + Sync {
    fn base(&self) -> &BaseForm;

    fn base_mut(&mut self) -> &mut BaseForm;

    fn fields(&self) -> &[FormFieldDef] {
        self.base().fields()
    }

    /// Reads each field's raw value from `data` through its widget.
    fn bind(&mut self, data: &QueryDict) {
        self.base_mut().bind_data(data);
    }

    fn is_bound(&self) -> bool {
        self.base().bound
    }

    /// Cross-field validation run after every field has been cleaned.
    async fn clean(&mut self) -> Result<(), FormErrors> {
        Ok(())
    }

    /// Cleans every field, then runs [`Form::clean`]. Unbound forms are
    /// never valid.
    async fn is_valid(&mut self) -> bool {
        if !self.is_bound() {
            return false;
        }
        self.base_mut().clean_fields();
        if let Err(errors) = self.clean().await {
            self.base_mut().merge_errors(errors);
        }
        self.errors().is_empty()
    }

    fn errors(&self) -> &FormErrors {
        &self.base().errors
    }

    /// Values of the fields that cleaned successfully.
    fn cleaned_data(&self) -> &HashMap<String, Value> {
        &self.base().cleaned_data
    }

    /// A JSON context for templates.
    fn as_context(&self) -> serde_json::Value {
        self.base().context()
    }
}

/// Field definitions plus binding and validation state.
///
/// # Examples
///
/// ```
/// # tokio_test::block_on(async {
/// use django_core_forms::{BaseForm, CharFieldStripped, Form, IntegerField};
/// use django_core_db::Value;
/// use django_core_http::QueryDict;
///
/// let mut form = BaseForm::new(vec![
///     CharFieldStripped::new("name"),
///     IntegerField::new("age").required(false),
/// ]);
/// form.bind(&QueryDict::parse("name=+Ann+&age=30"));
/// assert!(form.is_valid().await);
/// assert_eq!(form.cleaned_data()["name"], Value::from("Ann"));
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct BaseForm {
    field_defs: Vec<FormFieldDef>,
    initial: HashMap<String, Value>,
    prefix: Option<String>,
    bound: bool,
    raw_data: HashMap<String, Option<Value>>,
    errors: FormErrors,
    cleaned_data: HashMap<String, Value>,
}

impl BaseForm {
    pub fn new(fields: Vec<FormFieldDef>) -> Self {
        Self {
            field_defs: fields,
            ..Self::default()
        }
    }

    /// Initial values, taking precedence over each field's own `initial`.
    #[must_use]
    pub fn with_initial(mut self, initial: HashMap<String, Value>) -> Self {
        self.initial = initial;
        self
    }

    /// Namespaces HTML names as `{prefix}-{name}`.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Appends fields, replacing any with the same name.
    pub fn add_fields(&mut self, fields: impl IntoIterator<Item = FormFieldDef>) {
        for field in fields {
            match self.field_defs.iter_mut().find(|f| f.name == field.name) {
                Some(existing) => *existing = field,
                None => self.field_defs.push(field),
            }
        }
    }

    pub fn fields(&self) -> &[FormFieldDef] {
        &self.field_defs
    }

    pub fn field(&self, name: &str) -> Option<&FormFieldDef> {
        self.field_defs.iter().find(|f| f.name == name)
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// The HTML name of a field.
    pub fn html_name(&self, name: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}-{name}"),
            None => name.to_string(),
        }
    }

    fn bind_data(&mut self, data: &QueryDict) {
        self.bound = true;
        self.errors.clear();
        self.cleaned_data.clear();
        self.raw_data = self
            .field_defs
            .iter()
            .map(|field| {
                let value = field
                    .widget
                    .value_from_data(data, &self.html_name(&field.name));
                (field.name.clone(), value)
            })
            .collect();
    }

    /// The raw value bound for `name`.
    pub fn raw_value(&self, name: &str) -> Option<&Value> {
        self.raw_data.get(name).and_then(Option::as_ref)
    }

    /// The initial value of a field.
    pub fn initial_value(&self, name: &str) -> Option<&Value> {
        self.initial
            .get(name)
            .or_else(|| self.field(name).and_then(|f| f.initial.as_ref()))
    }

    fn clean_fields(&mut self) {
        self.errors.clear();
        self.cleaned_data.clear();
        for field in &self.field_defs {
            let raw = self.raw_data.get(&field.name).and_then(Option::as_ref);
            match clean_field_value(field, raw) {
                Ok(value) => {
                    self.cleaned_data.insert(field.name.clone(), value);
                }
                Err(messages) => {
                    self.errors.insert(field.name.clone(), messages);
                }
            }
        }
    }

    fn merge_errors(&mut self, errors: FormErrors) {
        for (key, messages) in errors {
            self.cleaned_data.remove(&key);
            self.errors.entry(key).or_default().extend(messages);
        }
    }

    /// Records an error on `field` (or [`NON_FIELD_ERRORS`]) and drops its
    /// cleaned value.
    pub fn add_error(&mut self, field: &str, message: impl Into<String>) {
        self.cleaned_data.remove(field);
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    pub fn non_field_errors(&self) -> &[String] {
        self.errors.get(NON_FIELD_ERRORS).map_or(&[], Vec::as_slice)
    }

    /// A cleaned value by name.
    pub fn cleaned_value(&self, name: &str) -> Option<&Value> {
        self.cleaned_data.get(name)
    }

    /// Renders a field's widget with the bound value, or the initial value
    /// when unbound.
    pub fn render_field(&self, name: &str) -> Option<String> {
        let field = self.field(name)?;
        let value = if self.bound {
            self.raw_value(name)
        } else {
            self.initial_value(name)
        };
        let attrs = HashMap::from([("id".to_string(), format!("id_{}", self.html_name(name)))]);
        Some(field.widget.render(&self.html_name(name), value, &attrs))
    }

    fn context(&self) -> serde_json::Value {
        let fields: Vec<serde_json::Value> = self
            .field_defs
            .iter()
            .map(|field| {
                serde_json::json!({
                    "name": self.html_name(&field.name),
                    "label": field.label,
                    "help_text": field.help_text,
                    "required": field.required,
                    "html": self.render_field(&field.name).unwrap_or_default(),
                    "errors": self.errors.get(&field.name).cloned().unwrap_or_default(),
                })
            })
            .collect();
        serde_json::json!({
            "fields": fields,
            "errors": self.errors,
            "non_field_errors": self.non_field_errors(),
            "is_bound": self.bound,
        })
    }
}

#[async_trait]
impl Form for BaseForm {
    fn base(&self) -> &BaseForm {
        self
    }

    fn base_mut(&mut self) -> &mut BaseForm {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{CharFieldStripped, CommaSeparatedIntegerListField, IntegerField};

    fn make_form() -> BaseForm {
        BaseForm::new(vec![
            CharFieldStripped::new("username").min_length(3).max_length(20),
            IntegerField::new("age").required(false),
            CommaSeparatedIntegerListField::new("ids").required(false),
        ])
    }

    #[tokio::test]
    async fn test_unbound_form_is_invalid() {
        let mut form = make_form();
        assert!(!form.is_bound());
        assert!(!form.is_valid().await);
    }

    #[tokio::test]
    async fn test_bind_and_validate() {
        let mut form = make_form();
        form.bind(&QueryDict::parse("username=alice&age=30&ids=1,+2"));
        assert!(form.is_valid().await);
        assert_eq!(form.cleaned_data()["username"], Value::from("alice"));
        assert_eq!(form.cleaned_data()["age"], Value::Int(30));
        assert_eq!(
            form.cleaned_data()["ids"],
            Value::List(vec![Value::Int(1), Value::Int(2)])
        );
    }

    #[tokio::test]
    async fn test_errors_accumulate() {
        let mut form = make_form();
        form.bind(&QueryDict::parse("username=ab&age=x"));
        assert!(!form.is_valid().await);
        assert!(form.errors().contains_key("username"));
        assert!(form.errors().contains_key("age"));
        assert!(!form.cleaned_data().contains_key("age"));
    }

    #[tokio::test]
    async fn test_prefix() {
        let mut form = make_form().with_prefix("f");
        form.bind(&QueryDict::parse("f-username=alice&username=ignored"));
        assert!(form.is_valid().await);
        assert_eq!(form.cleaned_data()["username"], Value::from("alice"));
    }

    struct MatchingPasswords {
        base: BaseForm,
    }

    #[async_trait]
    impl Form for MatchingPasswords {
        fn base(&self) -> &BaseForm {
            &self.base
        }

        fn base_mut(&mut self) -> &mut BaseForm {
            &mut self.base
        }

        async fn clean(&mut self) -> Result<(), FormErrors> {
            let data = self.cleaned_data();
            if data.get("password1") == data.get("password2") {
                Ok(())
            } else {
                Err(FormErrors::from([(
                    NON_FIELD_ERRORS.to_string(),
                    vec!["Passwords don't match.".to_string()],
                )]))
            }
        }
    }

    #[tokio::test]
    async fn test_clean_hook() {
        let mut form = MatchingPasswords {
            base: BaseForm::new(vec![
                CharFieldStripped::new("password1"),
                CharFieldStripped::new("password2"),
            ]),
        };
        form.bind(&QueryDict::parse("password1=a&password2=b"));
        assert!(!form.is_valid().await);
        assert_eq!(form.base().non_field_errors(), ["Passwords don't match."]);

        form.bind(&QueryDict::parse("password1=a&password2=a"));
        assert!(form.is_valid().await);
    }

    #[test]
    fn test_render_and_context() {
        let form = BaseForm::new(vec![IntegerField::new("p").initial(1)]);
        assert_eq!(
            form.render_field("p").unwrap(),
            r#"<input type="text" name="p" value="1" id="id_p" />"#
        );
        let ctx = form.as_context();
        assert_eq!(ctx["is_bound"], false);
        assert_eq!(ctx["fields"][0]["label"], "P");
        assert_eq!(ctx["fields"][0]["required"], true);
        assert!(form.render_field("missing").is_none());
    }

    #[test]
    fn test_add_fields_replaces_by_name() {
        let mut form = make_form();
        form.add_fields([IntegerField::new("username"), IntegerField::new("extra")]);
        assert_eq!(form.fields().len(), 4);
        assert!(matches!(
            form.field("username").unwrap().field_type,
            crate::fields::FormFieldType::Integer { .. }
        ));
    }
}
