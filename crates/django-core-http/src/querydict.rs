//! Query string dictionary for GET and POST parameters.

use django_core_common::error::{CoreError, CoreResult};

/// An ordered multi-value dictionary parsed from a query string or form body.
///
/// Immutable by default; [`copy`](QueryDict::copy) returns a mutable clone.
///
/// # Examples
///
/// ```
/// use django_core_http::QueryDict;
///
/// let qd = QueryDict::parse("color=red&color=blue&size=large");
/// assert_eq!(qd.get("color"), Some("blue"));
/// assert_eq!(qd.get_list("color"), vec!["red", "blue"]);
///
/// let mut mutable = qd.copy();
/// mutable.set("color", "green").unwrap();
/// assert_eq!(mutable.get("color"), Some("green"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryDict {
    entries: Vec<(String, Vec<String>)>,
    mutable: bool,
}

fn immutable() -> CoreError {
    CoreError::NotAllowed("This QueryDict instance is immutable".to_string())
}

impl QueryDict {
    /// Creates an empty, immutable `QueryDict`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty, mutable `QueryDict`.
    pub fn new_mutable() -> Self {
        Self {
            entries: Vec::new(),
            mutable: true,
        }
    }

    /// Parses `key=value&key2=value2`, decoding `+` and percent escapes.
    pub fn parse(query_string: &str) -> Self {
        let mut qd = Self::new_mutable();
        for pair in query_string.trim_start_matches('?').split('&') {
            if pair.is_empty() {
                continue;
            }
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            qd.push(percent_decode(key), percent_decode(value));
        }
        qd.mutable = false;
        qd
    }

    /// Builds a `QueryDict` from key-value pairs.
    pub fn from_pairs<K, V>(pairs: &[(K, V)]) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut qd = Self::new_mutable();
        for (key, value) in pairs {
            qd.push(key.as_ref().to_string(), value.as_ref().to_string());
        }
        qd.mutable = false;
        qd
    }

    fn push(&mut self, key: String, value: String) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((key, vec![value])),
        }
    }

    /// Returns the last value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, values)| values.last())
            .map(String::as_str)
    }

    /// Returns every value for `key`; empty if absent.
    pub fn get_list(&self, key: &str) -> Vec<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Replaces all values of `key`.
    pub fn set(&mut self, key: &str, value: &str) -> CoreResult<()> {
        if !self.mutable {
            return Err(immutable());
        }
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, values)) => *values = vec![value.to_string()],
            None => self.entries.push((key.to_string(), vec![value.to_string()])),
        }
        Ok(())
    }

    /// Appends a value to `key`.
    pub fn append(&mut self, key: &str, value: &str) -> CoreResult<()> {
        if !self.mutable {
            return Err(immutable());
        }
        self.push(key.to_string(), value.to_string());
        Ok(())
    }

    /// Removes `key`, returning its values.
    pub fn remove(&mut self, key: &str) -> CoreResult<Option<Vec<String>>> {
        if !self.mutable {
            return Err(immutable());
        }
        let position = self.entries.iter().position(|(k, _)| k == key);
        Ok(position.map(|i| self.entries.remove(i).1))
    }

    /// Returns a mutable copy.
    #[must_use]
    pub fn copy(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            mutable: true,
        }
    }

    /// Iterates over keys paired with their last value, in insertion order.
    pub fn items(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().filter_map(|(k, values)| {
            values.last().map(|value| (k.as_str(), value.as_str()))
        })
    }

    /// Iterates over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Encodes as a query string, keys in insertion order.
    pub fn urlencode(&self) -> String {
        self.entries
            .iter()
            .flat_map(|(key, values)| {
                values
                    .iter()
                    .map(move |value| format!("{}={}", percent_encode(key), percent_encode(value)))
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Whether `set`, `append` and `remove` are allowed.
    pub const fn is_mutable(&self) -> bool {
        self.mutable
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when there are no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `true` when `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// The last value of each key as a JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.items()
                .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
                .collect(),
        )
    }
}

fn percent_decode(input: &str) -> String {
    let plus_decoded = input.replace('+', " ");
    percent_encoding::percent_decode_str(&plus_decoded)
        .decode_utf8_lossy()
        .into_owned()
}

fn percent_encode(input: &str) -> String {
    percent_encoding::utf8_percent_encode(input, percent_encoding::NON_ALPHANUMERIC).to_string()
}
