//! Filter and tag libraries, and their installation into tera.
//!
//! ```
//! use django_core_template::{ContextValue, Library};
//!
//! let lib = Library::django_core();
//! let obj = ContextValue::from(serde_json::json!({"a": 1}));
//! let out = lib
//!     .apply_filter("getitem", &obj, &[ContextValue::from("a")])
//!     .unwrap();
//! assert_eq!(out, ContextValue::Integer(1));
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use django_core_common::error::{CoreError, CoreResult};

use crate::context::ContextValue;
use crate::filters::{builtin_filters, Filter};

/// A simple tag: positional string arguments in, a value out.
pub type SimpleTagFn = fn(&[String]) -> ContextValue;

/// A named collection of filters and simple tags.
pub struct Library {
    name: String,
    filters: HashMap<String, Arc<dyn Filter>>,
    simple_tags: HashMap<String, SimpleTagFn>,
}

impl Library {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            filters: HashMap::new(),
            simple_tags: HashMap::new(),
        }
    }

    /// The built-in filters plus the `utcnow` and `utcnow_timestamp` tags.
    pub fn django_core() -> Self {
        let mut lib = Self::new("django_core");
        for filter in builtin_filters() {
            lib.register_filter(filter);
        }
        lib.register_simple_tag("utcnow", utcnow);
        lib.register_simple_tag("utcnow_timestamp", utcnow_timestamp);
        lib
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registers a filter under its own name, replacing any previous one.
    pub fn register_filter(&mut self, filter: Box<dyn Filter>) {
        self.filters.insert(filter.name().to_string(), Arc::from(filter));
    }

    pub fn register_simple_tag(&mut self, name: impl Into<String>, func: SimpleTagFn) {
        self.simple_tags.insert(name.into(), func);
    }

    pub fn get_filter(&self, name: &str) -> Option<&Arc<dyn Filter>> {
        self.filters.get(name)
    }

    pub fn has_filter(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.simple_tags.contains_key(name)
    }

    /// Applies a filter by name.
    pub fn apply_filter(
        &self,
        name: &str,
        value: &ContextValue,
        args: &[ContextValue],
    ) -> CoreResult<ContextValue> {
        let filter = self
            .filters
            .get(name)
            .ok_or_else(|| CoreError::TemplateError(format!("Unknown filter: {name}")))?;
        filter.apply(value, args)
    }

    /// Calls a simple tag by name.
    pub fn call_tag(&self, name: &str, args: &[String]) -> CoreResult<ContextValue> {
        let tag = self
            .simple_tags
            .get(name)
            .ok_or_else(|| CoreError::TemplateError(format!("Unknown tag: {name}")))?;
        Ok(tag(args))
    }

    /// Installs every filter and tag into `tera`. Tags become functions:
    /// `{{ utcnow() }}`.
    pub fn install(&self, tera: &mut tera::Tera) {
        for (name, filter) in &self.filters {
            tera.register_filter(name, TeraFilter(Arc::clone(filter)));
        }
        for (name, tag) in &self.simple_tags {
            let tag = *tag;
            tera.register_function(name, move |args: &HashMap<String, tera::Value>| {
                let mut keys: Vec<&String> = args.keys().collect();
                keys.sort();
                let args: Vec<String> = keys
                    .into_iter()
                    .map(|k| ContextValue::from(args[k].clone()).to_display_string())
                    .collect();
                Ok(tag(&args).to_json())
            });
        }
        tracing::debug!(
            library = %self.name,
            filters = self.filters.len(),
            tags = self.simple_tags.len(),
            "installed template library"
        );
    }
}

impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut filters: Vec<&String> = self.filters.keys().collect();
        filters.sort();
        let mut tags: Vec<&String> = self.simple_tags.keys().collect();
        tags.sort();
        f.debug_struct("Library")
            .field("name", &self.name)
            .field("filters", &filters)
            .field("simple_tags", &tags)
            .finish()
    }
}

/// Installs the default library into `tera`.
pub fn register_tera(tera: &mut tera::Tera) {
    Library::django_core().install(tera);
}

// ── tera adapter ───────────────────────────────────────────────────────

/// Adapts a [`Filter`] to tera, mapping named arguments onto positions.
struct TeraFilter(Arc<dyn Filter>);

impl tera::Filter for TeraFilter {
    fn filter(
        &self,
        value: &tera::Value,
        args: &HashMap<String, tera::Value>,
    ) -> tera::Result<tera::Value> {
        let positional: Vec<ContextValue> = self
            .0
            .arg_names()
            .iter()
            .map_while(|name| args.get(*name).cloned().map(ContextValue::from))
            .collect();
        self.0
            .apply(&ContextValue::from(value.clone()), &positional)
            .map(|out| out.to_json())
            .map_err(|e| tera::Error::msg(e.to_string()))
    }

    fn is_safe(&self) -> bool {
        self.0.is_safe()
    }
}

// ── Tags ───────────────────────────────────────────────────────────────

fn utcnow(_args: &[String]) -> ContextValue {
    ContextValue::String(Utc::now().format("%Y-%m-%d %H:%M:%S%.6f").to_string())
}

#[allow(clippy::cast_precision_loss)]
fn utcnow_timestamp(_args: &[String]) -> ContextValue {
    ContextValue::Float(Utc::now().timestamp_micros() as f64 / 1_000_000.0)
}
