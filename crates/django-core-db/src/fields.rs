//! Model fields that store lists and JSON documents as text.
//!
//! [`ListField`] stores a list as a Python-style literal (`['a', 5]`), the
//! format existing rows were written in. [`IntegerListField`] narrows that to
//! integers with optional bounds, and [`JsonField`] stores any JSON document.

use django_core_common::error::ValidationError;

use crate::value::Value;

// ── Literal parsing and formatting ─────────────────────────────────────

/// Formats a value as a Python literal.
///
/// ```
/// use django_core_db::fields::to_python_literal;
/// use django_core_db::value::Value;
///
/// let list = Value::List(vec![Value::from("a"), Value::Int(5), Value::Null]);
/// assert_eq!(to_python_literal(&list), "['a', 5, None]");
/// ```
pub fn to_python_literal(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => float_repr(*f),
        Value::String(s) => quote_str(s),
        Value::DateTime(dt) => quote_str(&dt.to_string()),
        Value::Json(j) => quote_str(&j.to_string()),
        Value::List(items) => {
            let inner: Vec<String> = items.iter().map(to_python_literal).collect();
            format!("[{}]", inner.join(", "))
        }
    }
}

/// Shortest round-trip digits, with an exponent (`1e+16`, `2.5e-05`) when
/// the decimal exponent is below -4 or at least 16.
fn float_repr(f: f64) -> String {
    if f.is_nan() {
        return "nan".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let scientific = format!("{f:e}");
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    if !(-4..16).contains(&exponent) {
        let sign = if exponent < 0 { '-' } else { '+' };
        return format!("{mantissa}e{sign}{:02}", exponent.abs());
    }
    let plain = f.to_string();
    if plain.contains('.') {
        plain
    } else {
        format!("{plain}.0")
    }
}

fn quote_str(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

struct LiteralParser<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl<'a> LiteralParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
        }
    }

    fn skip_ws(&mut self) {
        while self.chars.peek().is_some_and(|c| c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn parse_document(mut self) -> Option<Value> {
        let value = self.parse_value()?;
        self.skip_ws();
        self.chars.peek().is_none().then_some(value)
    }

    fn parse_value(&mut self) -> Option<Value> {
        self.skip_ws();
        match *self.chars.peek()? {
            '[' => self.parse_sequence('[', ']'),
            '(' => self.parse_sequence('(', ')'),
            '\'' | '"' => self.parse_string(),
            c if c == '-' || c == '+' || c == '.' || c.is_ascii_digit() => self.parse_number(),
            c if c.is_ascii_alphabetic() => self.parse_keyword(),
            _ => None,
        }
    }

    fn parse_sequence(&mut self, open: char, close: char) -> Option<Value> {
        if self.chars.next()? != open {
            return None;
        }
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.chars.peek() == Some(&close) {
                self.chars.next();
                return Some(Value::List(items));
            }
            items.push(self.parse_value()?);
            self.skip_ws();
            match self.chars.next()? {
                ',' => {}
                c if c == close => return Some(Value::List(items)),
                _ => return None,
            }
        }
    }

    fn parse_string(&mut self) -> Option<Value> {
        let quote = self.chars.next()?;
        let mut out = String::new();
        loop {
            match self.chars.next()? {
                '\\' => match self.chars.next()? {
                    'n' => out.push('\n'),
                    'r' => out.push('\r'),
                    't' => out.push('\t'),
                    other => out.push(other),
                },
                c if c == quote => return Some(Value::String(out)),
                c => out.push(c),
            }
        }
    }

    fn parse_number(&mut self) -> Option<Value> {
        let mut raw = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E' | '_') {
                raw.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        let raw = raw.replace('_', "");
        raw.parse::<i64>()
            .map(Value::Int)
            .or_else(|_| raw.parse::<f64>().map(Value::Float))
            .ok()
    }

    fn parse_keyword(&mut self) -> Option<Value> {
        let mut word = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                word.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        match word.as_str() {
            "None" => Some(Value::Null),
            "True" => Some(Value::Bool(true)),
            "False" => Some(Value::Bool(false)),
            _ => None,
        }
    }
}

/// Parses a Python literal made of lists, tuples, strings, numbers,
/// `True`, `False` and `None`. Returns `None` for anything else.
///
/// ```
/// use django_core_db::fields::parse_python_literal;
/// use django_core_db::value::Value;
///
/// assert_eq!(
///     parse_python_literal("['a', 2]"),
///     Some(Value::List(vec![Value::from("a"), Value::Int(2)]))
/// );
/// assert_eq!(parse_python_literal("[1, oops]"), None);
/// ```
pub fn parse_python_literal(input: &str) -> Option<Value> {
    LiteralParser::new(input).parse_document()
}

// ── ListField ──────────────────────────────────────────────────────────

/// A list stored as text.
#[derive(Debug, Clone, PartialEq)]
pub struct ListField {
    /// Maximum length of the stored text.
    pub max_length: usize,
    /// Allowed item values with their labels. `None` allows anything.
    pub choices: Option<Vec<(Value, String)>>,
}

impl Default for ListField {
    fn default() -> Self {
        Self {
            max_length: 2000,
            choices: None,
        }
    }
}

fn invalid_list(value: &impl std::fmt::Display) -> ValidationError {
    ValidationError::new(format!("'{value}' value must be a list type."), "invalid_list")
        .with_param("value", value)
}

impl ListField {
    /// A list field with the default 2000 character limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts list items to `choices`.
    #[must_use]
    pub fn with_choices(mut self, choices: Vec<(Value, String)>) -> Self {
        self.choices = Some(choices);
        self
    }

    fn check_choices(&self, items: &[Value]) -> Result<(), ValidationError> {
        let Some(choices) = &self.choices else {
            return Ok(());
        };
        for item in items {
            if !choices.iter().any(|(choice, _)| choice.loosely_equals(item)) {
                return Err(ValidationError::new(
                    format!("'{item}' is not a valid choice."),
                    "invalid_choice",
                )
                .with_param("value", item));
            }
        }
        Ok(())
    }

    /// Converts a stored or submitted value into a list.
    ///
    /// `Null` stays `None`, empty values become an empty list, lists are
    /// checked against the choices and strings are parsed as literals.
    pub fn to_python(&self, value: &Value) -> Result<Option<Vec<Value>>, ValidationError> {
        match value {
            Value::Null => Ok(None),
            v if !v.is_truthy() => Ok(Some(Vec::new())),
            Value::List(items) => {
                self.check_choices(items)?;
                Ok(Some(items.clone()))
            }
            Value::String(s) => match parse_python_literal(s) {
                Some(Value::List(items)) => Ok(Some(items)),
                _ => Err(invalid_list(s)),
            },
            other => Err(invalid_list(other)),
        }
    }

    /// Converts a list into its stored text form.
    pub fn get_prep_value(&self, value: &Value) -> Result<Option<String>, ValidationError> {
        match value {
            Value::Null => Ok(None),
            Value::List(_) => Ok(Some(to_python_literal(value))),
            other => Err(invalid_list(other)),
        }
    }

    /// Checks choices and the stored length of a list.
    pub fn validate(&self, items: &[Value]) -> Result<(), ValidationError> {
        self.check_choices(items)?;
        let stored = to_python_literal(&Value::List(items.to_vec()));
        let length = stored.chars().count();
        if length > self.max_length {
            return Err(ValidationError::new(
                format!(
                    "Ensure this value has at most {} characters (it has {length}).",
                    self.max_length
                ),
                "max_length",
            )
            .with_param("limit_value", self.max_length)
            .with_param("show_value", length));
        }
        Ok(())
    }
}

// ── IntegerListField ───────────────────────────────────────────────────

/// A [`ListField`] whose items must be integers within optional bounds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntegerListField {
    /// The underlying list field.
    pub list: ListField,
    /// Smallest allowed item.
    pub min_value: Option<i64>,
    /// Largest allowed item.
    pub max_value: Option<i64>,
}

impl IntegerListField {
    /// An integer list with the given bounds.
    pub fn new(min_value: Option<i64>, max_value: Option<i64>) -> Self {
        Self {
            list: ListField::default(),
            min_value,
            max_value,
        }
    }

    fn to_int(item: &Value) -> Option<i64> {
        match item {
            Value::Int(i) => Some(*i),
            Value::Bool(b) => Some(i64::from(*b)),
            #[allow(clippy::cast_possible_truncation)]
            Value::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Converts to a list of integers, enforcing the bounds.
    pub fn to_python(&self, value: &Value) -> Result<Option<Vec<i64>>, ValidationError> {
        let Some(items) = self.list.to_python(value)? else {
            return Ok(None);
        };
        let ints: Option<Vec<i64>> = items.iter().map(Self::to_int).collect();
        let ints = ints.ok_or_else(|| {
            let shown = to_python_literal(&Value::List(items.clone()));
            ValidationError::new(
                format!("All values in list \"{shown}\" must be of integer types."),
                "invalid_integers",
            )
            .with_param("value", shown)
        })?;

        for &item in &ints {
            if let Some(min) = self.min_value.filter(|min| item < *min) {
                return Err(ValidationError::new(
                    format!("\"{item}\" out of range. Must be greater than or equal to {min}"),
                    "invalid_out_of_range_min",
                )
                .with_param("value", item)
                .with_param("min", min));
            }
            if let Some(max) = self.max_value.filter(|max| item > *max) {
                return Err(ValidationError::new(
                    format!("\"{item}\" out of range. Must be less than or equal to {max}"),
                    "invalid_out_of_range_max",
                )
                .with_param("value", item)
                .with_param("max", max));
            }
        }
        Ok(Some(ints))
    }

    /// Stored text form with all spaces removed.
    pub fn get_prep_value(&self, value: &Value) -> Result<Option<String>, ValidationError> {
        let prepped = self.list.get_prep_value(value)?;
        if value.is_truthy() {
            return Ok(prepped.map(|s| s.replace(' ', "")));
        }
        Ok(prepped)
    }
}

// ── JsonField ──────────────────────────────────────────────────────────

/// A JSON document stored as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonField {
    /// When set, empty input converts to `None`.
    pub blank: bool,
}

fn invalid_json(err: &serde_json::Error) -> ValidationError {
    ValidationError::new(err.to_string(), "invalid_json")
}

impl JsonField {
    /// The default stored value, an empty object.
    pub const DEFAULT: &'static str = "{}";

    /// Returns the default document.
    pub fn default_value() -> serde_json::Value {
        serde_json::Value::Object(serde_json::Map::new())
    }

    /// Converts stored text (or an existing document) into JSON.
    pub fn to_python(&self, value: &Value) -> Result<Option<serde_json::Value>, ValidationError> {
        match value {
            Value::Json(doc) => Ok(Some(doc.clone())),
            v if self.blank && !v.is_truthy() => Ok(None),
            Value::String(s) => serde_json::from_str(s)
                .map(Some)
                .map_err(|e| invalid_json(&e)),
            other => Ok(Some(other.to_json())),
        }
    }

    /// Checks that a string value is valid JSON.
    pub fn validate(&self, value: &str) -> Result<(), ValidationError> {
        if !self.blank && value.is_empty() {
            return Err(ValidationError::new("This field cannot be blank.", "blank"));
        }
        if value.is_empty() {
            return Ok(());
        }
        serde_json::from_str::<serde_json::Value>(value)
            .map(|_| ())
            .map_err(|e| invalid_json(&e))
    }

    /// Serializes a document for storage.
    pub fn get_prep_value(&self, value: &serde_json::Value) -> Result<String, ValidationError> {
        serde_json::to_string(value).map_err(|e| invalid_json(&e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn strings(items: &[&str]) -> Value {
        Value::List(items.iter().map(|s| Value::from(*s)).collect())
    }

    #[test]
    fn test_literal_repr() {
        assert_eq!(to_python_literal(&strings(&["hello", "world"])), "['hello', 'world']");
        assert_eq!(to_python_literal(&Value::from("it's")), "\"it's\"");
        assert_eq!(to_python_literal(&Value::Float(2.0)), "2.0");
        assert_eq!(to_python_literal(&Value::Float(-0.0)), "-0.0");
        assert_eq!(to_python_literal(&Value::Float(0.1)), "0.1");
        assert_eq!(to_python_literal(&Value::Float(0.0001)), "0.0001");
        assert_eq!(to_python_literal(&Value::Float(1e15)), "1000000000000000.0");
        assert_eq!(
            to_python_literal(&Value::List(vec![Value::Bool(true), Value::List(vec![])])),
            "[True, []]"
        );
    }

    #[test]
    fn test_large_and_small_floats_use_exponents() {
        assert_eq!(to_python_literal(&Value::Float(1e16)), "1e+16");
        assert_eq!(to_python_literal(&Value::Float(1e20)), "1e+20");
        assert_eq!(to_python_literal(&Value::Float(-1.5e300)), "-1.5e+300");
        assert_eq!(to_python_literal(&Value::Float(2.5e-5)), "2.5e-05");
        assert_eq!(to_python_literal(&Value::Float(f64::INFINITY)), "inf");
        assert_eq!(
            parse_python_literal("[1e+20]"),
            Some(Value::List(vec![Value::Float(1e20)]))
        );
    }

    #[test]
    fn test_literal_parse() {
        assert_eq!(
            parse_python_literal("[ 'a' , \"b\", 1.5, -3, None, (1, 2) ]"),
            Some(Value::List(vec![
                Value::from("a"),
                Value::from("b"),
                Value::Float(1.5),
                Value::Int(-3),
                Value::Null,
                Value::List(vec![Value::Int(1), Value::Int(2)]),
            ]))
        );
        assert_eq!(parse_python_literal("['a' 'b']"), None);
        assert_eq!(parse_python_literal("['unterminated]"), None);
        assert_eq!(parse_python_literal("[1] trailing"), None);
    }

    #[test]
    fn test_list_to_python() {
        let field = ListField::new();
        assert_eq!(field.to_python(&Value::Null).unwrap(), None);
        assert_eq!(field.to_python(&Value::from("")).unwrap(), Some(vec![]));
        assert_eq!(
            field.to_python(&Value::from("['hello', 'world']")).unwrap(),
            Some(vec![Value::from("hello"), Value::from("world")])
        );
        assert_eq!(field.to_python(&Value::from("nope")).unwrap_err().code, "invalid_list");
        assert_eq!(field.to_python(&Value::from("5")).unwrap_err().code, "invalid_list");
    }

    #[test]
    fn test_list_choices() {
        let field = ListField::new().with_choices(vec![
            (Value::from("a"), "A".into()),
            (Value::from("b"), "B".into()),
        ]);
        assert!(field.to_python(&strings(&["a", "b"])).is_ok());
        let err = field.to_python(&strings(&["a", "z"])).unwrap_err();
        assert_eq!(err.code, "invalid_choice");
        assert_eq!(err.params["value"], "z");
    }

    #[test]
    fn test_list_prep() {
        let field = ListField::new();
        assert_eq!(field.get_prep_value(&Value::Null).unwrap(), None);
        assert_eq!(
            field.get_prep_value(&strings(&["x"])).unwrap().as_deref(),
            Some("['x']")
        );
        assert_eq!(field.get_prep_value(&Value::Int(3)).unwrap_err().code, "invalid_list");
    }

    #[test]
    fn test_list_validate_length() {
        let field = ListField {
            max_length: 8,
            choices: None,
        };
        assert!(field.validate(&[Value::from("ab")]).is_ok());
        assert_eq!(
            field.validate(&[Value::from("abcdefg")]).unwrap_err().code,
            "max_length"
        );
    }

    #[test]
    fn test_integer_list() {
        let field = IntegerListField::new(Some(0), Some(10));
        assert_eq!(
            field.to_python(&Value::from("[1, 2, 3]")).unwrap(),
            Some(vec![1, 2, 3])
        );
        assert_eq!(field.to_python(&strings(&["4", "5"])).unwrap(), Some(vec![4, 5]));
        assert_eq!(
            field.to_python(&strings(&["x"])).unwrap_err().code,
            "invalid_integers"
        );
        let err = field.to_python(&Value::from("[-1]")).unwrap_err();
        assert_eq!(err.code, "invalid_out_of_range_min");
        assert_eq!(err.params["min"], "0");
        assert_eq!(
            field.to_python(&Value::from("[11]")).unwrap_err().code,
            "invalid_out_of_range_max"
        );
    }

    #[test]
    fn test_integer_list_prep_strips_spaces() {
        let field = IntegerListField::default();
        let value = Value::List(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(field.get_prep_value(&value).unwrap().as_deref(), Some("[1,2]"));
        assert_eq!(
            field.get_prep_value(&Value::List(vec![])).unwrap().as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn test_json_field() {
        let field = JsonField::default();
        assert_eq!(
            field.to_python(&Value::from("{\"a\": 1}")).unwrap(),
            Some(json!({"a": 1}))
        );
        assert_eq!(field.to_python(&Value::Json(json!([1]))).unwrap(), Some(json!([1])));
        assert_eq!(field.to_python(&Value::from("{")).unwrap_err().code, "invalid_json");
        assert!(field.validate("{\"a\": 1}").is_ok());
        assert!(field.validate("nope").is_err());
        assert_eq!(field.get_prep_value(&json!({"a": [1, 2]})).unwrap(), "{\"a\":[1,2]}");
        assert_eq!(JsonField::default_value(), json!({}));
    }

    #[test]
    fn test_json_field_blank() {
        let field = JsonField { blank: true };
        assert_eq!(field.to_python(&Value::from("")).unwrap(), None);
        assert!(field.validate("").is_ok());
    }
}
