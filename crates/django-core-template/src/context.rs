//! Values passed to and returned from template filters.

use std::collections::HashMap;
use std::fmt;

use django_core_db::mixins::{LinkOptions, UrlLink};
use django_core_db::Value;

/// A template value.
#[derive(Debug, Clone)]
pub enum ContextValue {
    /// A string that will be escaped on output.
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    List(Vec<ContextValue>),
    Dict(HashMap<String, ContextValue>),
    /// The absence of a value.
    None,
    /// A string that is already HTML and must not be escaped again.
    SafeString(String),
}

impl ContextValue {
    /// `None`, `false`, zero and empty values are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::None => false,
            Self::Bool(b) => *b,
            Self::Integer(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::String(s) | Self::SafeString(s) => !s.is_empty(),
            Self::List(l) => !l.is_empty(),
            Self::Dict(d) => !d.is_empty(),
        }
    }

    /// Text for output, without escaping.
    pub fn to_display_string(&self) -> String {
        match self {
            Self::String(s) | Self::SafeString(s) => s.clone(),
            Self::Integer(i) => i.to_string(),
            Self::Float(f) => {
                if f.fract() == 0.0 {
                    format!("{f:.1}")
                } else {
                    f.to_string()
                }
            }
            Self::Bool(b) => b.to_string(),
            Self::None => String::new(),
            Self::List(_) | Self::Dict(_) => self.to_json().to_string(),
        }
    }

    pub const fn is_safe(&self) -> bool {
        matches!(self, Self::SafeString(_))
    }

    /// Marks a string as safe HTML.
    #[must_use]
    pub fn mark_safe(self) -> Self {
        match self {
            Self::String(s) => Self::SafeString(s),
            other => other,
        }
    }

    /// Looks up a dict key or a list index.
    pub fn resolve_path(&self, key: &str) -> Option<&Self> {
        match self {
            Self::Dict(map) => map.get(key),
            Self::List(list) => key.parse::<usize>().ok().and_then(|i| list.get(i)),
            _ => None,
        }
    }

    pub const fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            Self::Bool(b) => Some(*b as i64),
            _ => None,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::SafeString(s) => Some(s),
            _ => None,
        }
    }

    /// Converts to JSON; safe strings lose their marking.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::String(s) | Self::SafeString(s) => serde_json::Value::String(s.clone()),
            Self::Integer(i) => serde_json::Value::from(*i),
            Self::Float(f) => serde_json::Value::from(*f),
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::None => serde_json::Value::Null,
            Self::List(items) => serde_json::Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Dict(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

impl fmt::Display for ContextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}

impl PartialEq for ContextValue {
    #[allow(clippy::cast_precision_loss)]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::String(a) | Self::SafeString(a), Self::String(b) | Self::SafeString(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Integer(a), Self::Float(b)) | (Self::Float(b), Self::Integer(a)) => {
                (*a as f64) == *b
            }
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::None, Self::None) => true,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Dict(a), Self::Dict(b)) => a == b,
            _ => false,
        }
    }
}

// ── From implementations ───────────────────────────────────────────────

impl From<&str> for ContextValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i32> for ContextValue {
    fn from(i: i32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<i64> for ContextValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<f64> for ContextValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for ContextValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl<T: Into<Self>> From<Vec<T>> for ContextValue {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Self>> From<Option<T>> for ContextValue {
    fn from(o: Option<T>) -> Self {
        o.map_or(Self::None, Into::into)
    }
}

impl From<serde_json::Value> for ContextValue {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Self::None,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Self::Integer)
                .or_else(|| n.as_f64().map(Self::Float))
                .unwrap_or(Self::None),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => {
                Self::Dict(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<&Value> for ContextValue {
    fn from(v: &Value) -> Self {
        match v {
            Value::Null => Self::None,
            Value::Bool(b) => Self::Bool(*b),
            Value::Int(i) => Self::Integer(*i),
            Value::Float(f) => Self::Float(*f),
            Value::String(s) => Self::String(s.clone()),
            Value::DateTime(_) => Self::String(v.to_string()),
            Value::List(items) => Self::List(items.iter().map(Self::from).collect()),
            Value::Json(j) => Self::from(j.clone()),
        }
    }
}

/// A model as a dict of its fields plus its urls and default links, for
/// the `get_*_url_link` filters.
pub fn url_link_context<M: UrlLink>(obj: &M) -> ContextValue {
    let mut map: HashMap<String, ContextValue> = obj
        .field_values()
        .into_iter()
        .map(|(name, value)| (name.to_string(), ContextValue::from(&value)))
        .collect();
    let options = LinkOptions::default();
    map.insert("absolute_url".into(), obj.get_absolute_url().into());
    map.insert("edit_url".into(), obj.get_edit_url().into());
    map.insert("delete_url".into(), obj.get_delete_url().into());
    map.insert(
        "absolute_url_link".into(),
        ContextValue::SafeString(obj.get_absolute_url_link(&options)),
    );
    map.insert(
        "edit_url_link".into(),
        ContextValue::SafeString(obj.get_edit_url_link(&options)),
    );
    map.insert(
        "delete_url_link".into(),
        ContextValue::SafeString(obj.get_delete_url_link(&options)),
    );
    ContextValue::Dict(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!ContextValue::None.is_truthy());
        assert!(!ContextValue::from("").is_truthy());
        assert!(!ContextValue::Integer(0).is_truthy());
        assert!(!ContextValue::List(vec![]).is_truthy());
        assert!(ContextValue::from("x").is_truthy());
        assert!(ContextValue::Float(0.5).is_truthy());
    }

    #[test]
    fn test_json_round_trip_keeps_numbers() {
        let json = serde_json::json!({"a": [1, 2.5, null, "x"], "b": true});
        let value = ContextValue::from(json.clone());
        assert_eq!(value.to_json(), json);
    }

    #[test]
    fn test_safe_and_plain_strings_compare_equal() {
        assert_eq!(ContextValue::SafeString("a".into()), ContextValue::from("a"));
        assert!(ContextValue::from("<b>").mark_safe().is_safe());
    }

    #[test]
    fn test_from_db_value() {
        let value = Value::List(vec![Value::Int(1), Value::Null, Value::from("s")]);
        assert_eq!(
            ContextValue::from(&value),
            ContextValue::List(vec![
                ContextValue::Integer(1),
                ContextValue::None,
                ContextValue::from("s"),
            ])
        );
    }
}
