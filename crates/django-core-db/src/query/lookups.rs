//! Field lookups and the composable [`Q`] filter.
//!
//! A [`Q`] tree is evaluated directly against model instances by
//! [`Q::matches`], which is what [`InMemoryStore`](crate::store::InMemoryStore)
//! uses to answer queries. Field names are resolved through
//! [`Model::lookup_value`], so `"pk"` always refers to the primary key.

use std::cmp::Ordering;
use std::ops;

use crate::model::Model;
use crate::value::Value;

/// A lookup operation applied to a single field.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// Exact match (`field = value`). `Exact(Value::Null)` matches nulls.
    Exact(Value),
    /// Case-insensitive exact match on strings.
    IExact(String),
    /// Substring match, or membership for list values.
    Contains(String),
    /// Case-insensitive substring match.
    IContains(String),
    /// Membership test (`field IN (values...)`).
    In(Vec<Value>),
    /// Greater than.
    Gt(Value),
    /// Greater than or equal.
    Gte(Value),
    /// Less than.
    Lt(Value),
    /// Less than or equal.
    Lte(Value),
    /// Starts with.
    StartsWith(String),
    /// NULL test (`true` for `IS NULL`).
    IsNull(bool),
}

impl Lookup {
    /// Tests a field value against this lookup.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::Exact(expected) => value.loosely_equals(expected),
            Self::IExact(expected) => value
                .as_str()
                .is_some_and(|s| s.to_lowercase() == expected.to_lowercase()),
            Self::Contains(needle) => match value {
                Value::String(s) => s.contains(needle.as_str()),
                Value::List(items) => items.iter().any(|v| v.as_str() == Some(needle.as_str())),
                _ => false,
            },
            Self::IContains(needle) => value
                .as_str()
                .is_some_and(|s| s.to_lowercase().contains(&needle.to_lowercase())),
            Self::In(candidates) => candidates.iter().any(|c| value.loosely_equals(c)),
            Self::Gt(bound) => value.compare(bound) == Some(Ordering::Greater),
            Self::Gte(bound) => matches!(
                value.compare(bound),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Self::Lt(bound) => value.compare(bound) == Some(Ordering::Less),
            Self::Lte(bound) => matches!(
                value.compare(bound),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Self::StartsWith(prefix) => value.as_str().is_some_and(|s| s.starts_with(prefix.as_str())),
            Self::IsNull(is_null) => value.is_null() == *is_null,
        }
    }
}

/// A composable query filter, equivalent to Django's `Q` object.
///
/// `Q` objects combine with `&` (AND), `|` (OR) and `!` (NOT).
///
/// ```
/// use django_core_db::query::{Lookup, Q};
///
/// let q = Q::eq("slug", "hello") & !Q::eq("is_deleted", true);
/// assert!(q.references_field("slug"));
/// assert!(!q.references_field("pk"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Q {
    /// A single field lookup.
    Filter {
        /// The field name.
        field: String,
        /// The lookup operation.
        lookup: Lookup,
    },
    /// Logical AND of multiple conditions. An empty AND matches everything.
    And(Vec<Q>),
    /// Logical OR of multiple conditions. An empty OR matches nothing.
    Or(Vec<Q>),
    /// Logical negation of a condition.
    Not(Box<Q>),
}

impl Q {
    /// Creates a new filter Q object.
    pub fn filter(field: impl Into<String>, lookup: Lookup) -> Self {
        Self::Filter {
            field: field.into(),
            lookup,
        }
    }

    /// A filter that matches every object.
    pub const fn all() -> Self {
        Self::And(Vec::new())
    }

    /// Shorthand for an [`Lookup::Exact`] filter.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::filter(field, Lookup::Exact(value.into()))
    }

    /// Shorthand for an [`Lookup::In`] filter.
    pub fn is_in<V: Into<Value>>(field: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Self::filter(field, Lookup::In(values.into_iter().map(Into::into).collect()))
    }

    /// Returns `true` if this is an empty AND or OR.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::And(children) | Self::Or(children) => children.is_empty(),
            _ => false,
        }
    }

    /// Returns `true` if any filter in the tree targets `field`.
    pub fn references_field(&self, field: &str) -> bool {
        match self {
            Self::Filter { field: f, .. } => f == field,
            Self::And(children) | Self::Or(children) => {
                children.iter().any(|c| c.references_field(field))
            }
            Self::Not(inner) => inner.references_field(field),
        }
    }

    /// Evaluates the filter against a model instance.
    pub fn matches<M: Model>(&self, obj: &M) -> bool {
        match self {
            Self::Filter { field, lookup } => lookup.matches(&obj.lookup_value(field)),
            Self::And(children) => children.iter().all(|c| c.matches(obj)),
            Self::Or(children) => children.iter().any(|c| c.matches(obj)),
            Self::Not(inner) => !inner.matches(obj),
        }
    }
}

impl ops::BitAnd for Q {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        match (self, rhs) {
            // Flatten nested ANDs
            (Self::And(mut left), Self::And(right)) => {
                left.extend(right);
                Self::And(left)
            }
            (Self::And(mut left), other) => {
                left.push(other);
                Self::And(left)
            }
            (other, Self::And(mut right)) => {
                right.insert(0, other);
                Self::And(right)
            }
            (left, right) => Self::And(vec![left, right]),
        }
    }
}

impl ops::BitOr for Q {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        match (self, rhs) {
            (Self::Or(mut left), Self::Or(right)) => {
                left.extend(right);
                Self::Or(left)
            }
            (Self::Or(mut left), other) => {
                left.push(other);
                Self::Or(left)
            }
            (other, Self::Or(mut right)) => {
                right.insert(0, other);
                Self::Or(right)
            }
            (left, right) => Self::Or(vec![left, right]),
        }
    }
}

impl ops::Not for Q {
    type Output = Self;

    fn not(self) -> Self::Output {
        // Double negation cancellation
        match self {
            Self::Not(inner) => *inner,
            other => Self::Not(Box::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_and_in() {
        assert!(Lookup::Exact(Value::from(5)).matches(&Value::Int(5)));
        assert!(Lookup::Exact(Value::Null).matches(&Value::Null));
        assert!(Lookup::In(vec![Value::from("a"), Value::from("b")]).matches(&Value::from("b")));
        assert!(!Lookup::In(vec![]).matches(&Value::from("b")));
    }

    #[test]
    fn test_string_lookups() {
        let v = Value::from("Hello World");
        assert!(Lookup::IExact("hello world".into()).matches(&v));
        assert!(Lookup::Contains("World".into()).matches(&v));
        assert!(!Lookup::Contains("world".into()).matches(&v));
        assert!(Lookup::IContains("world".into()).matches(&v));
        assert!(Lookup::StartsWith("Hell".into()).matches(&v));
    }

    #[test]
    fn test_contains_on_lists() {
        let v = Value::List(vec![Value::from("a"), Value::from("b")]);
        assert!(Lookup::Contains("a".into()).matches(&v));
        assert!(!Lookup::Contains("c".into()).matches(&v));
    }

    #[test]
    fn test_ordering_lookups() {
        let v = Value::Int(10);
        assert!(Lookup::Gt(Value::Int(5)).matches(&v));
        assert!(Lookup::Gte(Value::Int(10)).matches(&v));
        assert!(Lookup::Lt(Value::Float(10.5)).matches(&v));
        assert!(!Lookup::Lte(Value::Int(9)).matches(&v));
        assert!(!Lookup::Gt(Value::from("x")).matches(&v));
    }

    #[test]
    fn test_is_null() {
        assert!(Lookup::IsNull(true).matches(&Value::Null));
        assert!(Lookup::IsNull(false).matches(&Value::Int(0)));
    }

    #[test]
    fn test_and_flattening() {
        let q = Q::eq("a", 1) & Q::eq("b", 2) & Q::eq("c", 3);
        match q {
            Q::And(children) => assert_eq!(children.len(), 3),
            _ => panic!("Expected And"),
        }
    }

    #[test]
    fn test_or_flattening() {
        let q = Q::eq("a", 1) | (Q::eq("b", 2) | Q::eq("c", 3));
        match q {
            Q::Or(children) => assert_eq!(children.len(), 3),
            _ => panic!("Expected Or"),
        }
    }

    #[test]
    fn test_double_negation_cancels() {
        let q = Q::eq("a", 1);
        assert_eq!(!!q.clone(), q);
    }

    #[test]
    fn test_references_field_through_not() {
        let q = Q::eq("x", 1) & !Q::eq("pk", 3);
        assert!(q.references_field("pk"));
        assert!(Q::all().is_empty());
    }
}
