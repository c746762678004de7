//! Helpers for values that may be a single item or a list.

use serde_json::Value;

/// Either one item or a list of items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OneOrMany<T> {
    /// A single item.
    One(T),
    /// Zero or more items.
    Many(Vec<T>),
}

impl<T> From<T> for OneOrMany<T> {
    fn from(item: T) -> Self {
        Self::One(item)
    }
}

/// Normalizes an optional single item or list into a `Vec`.
///
/// ```
/// use django_core_common::utils::list::{make_obj_list, OneOrMany};
///
/// assert_eq!(make_obj_list(Some(OneOrMany::One("hello"))), vec!["hello"]);
/// assert_eq!(
///     make_obj_list(Some(OneOrMany::Many(vec!["hello", "world"]))),
///     vec!["hello", "world"]
/// );
/// assert!(make_obj_list::<&str>(None).is_empty());
/// ```
pub fn make_obj_list<T>(obj_or_objs: Option<OneOrMany<T>>) -> Vec<T> {
    match obj_or_objs {
        None => Vec::new(),
        Some(OneOrMany::One(item)) => vec![item],
        Some(OneOrMany::Many(items)) => items,
    }
}

/// Returns `false` for JSON values that read as empty: `null`, `false`, `0`,
/// `""`, `[]` and `{}`.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Lookup of nested object keys with a dotted path.
pub trait DotNotation {
    /// Follows `"a.b.c"` through nested objects.
    ///
    /// Returns `None` as soon as a step is missing or empty.
    fn get_by_dot_notation(&self, path: &str) -> Option<&Value>;
}

impl DotNotation for Value {
    fn get_by_dot_notation(&self, path: &str) -> Option<&Value> {
        let mut current = self;
        for key in path.split('.') {
            current = current.get(key)?;
            if !is_truthy(current) {
                return None;
            }
        }
        Some(current)
    }
}
