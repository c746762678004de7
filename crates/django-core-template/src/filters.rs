//! Built-in template filters.
//!
//! | filter | arguments | result |
//! |---|---|---|
//! | `getitem` | `key` | dict value, or `""` |
//! | `attr` | `name` | dict value, or `""` when the object is falsy or lacks it |
//! | `jsondumps` | | JSON text |
//! | `make_iterable` | | `[]` for falsy, lists as is, anything else wrapped |
//! | `substract`, `multiply`, `divide` | `by` | arithmetic |
//! | `absolute` | | absolute value; non-numbers pass through |
//! | `linebreaks_safe` | `autoescape` | `<p>`/`<br>` markup, only for text with a newline |
//! | `get_absolute_url_link`, `get_edit_url_link`, `get_delete_url_link` | `text` | an `<a>` link |

use django_core_common::error::{CoreError, CoreResult};
use django_core_common::utils::html::build_link;
use django_core_common::utils::text::linebreaks;

use crate::context::ContextValue;

/// A template filter.
pub trait Filter: Send + Sync {
    fn name(&self) -> &'static str;

    /// Names of the positional arguments, in order. Engines with named
    /// arguments pass them under these names.
    fn arg_names(&self) -> &'static [&'static str] {
        &[]
    }

    /// Whether the output is HTML that must not be escaped again.
    fn is_safe(&self) -> bool {
        false
    }

    fn apply(&self, value: &ContextValue, args: &[ContextValue]) -> CoreResult<ContextValue>;
}

fn arg<'a>(filter: &dyn Filter, args: &'a [ContextValue], index: usize) -> CoreResult<&'a ContextValue> {
    args.get(index).ok_or_else(|| {
        CoreError::TemplateError(format!(
            "{} requires argument '{}'",
            filter.name(),
            filter.arg_names().get(index).copied().unwrap_or("?")
        ))
    })
}

fn type_error(filter: &str, value: &ContextValue, other: &ContextValue) -> CoreError {
    CoreError::TemplateError(format!(
        "{filter}: unsupported operand types: {value:?} and {other:?}"
    ))
}

// ── Collections ────────────────────────────────────────────────────────

/// `{{ my_vals | getitem(key="hello") }}`.
pub struct GetItemFilter;

impl Filter for GetItemFilter {
    fn name(&self) -> &'static str {
        "getitem"
    }

    fn arg_names(&self) -> &'static [&'static str] {
        &["key"]
    }

    fn apply(&self, value: &ContextValue, args: &[ContextValue]) -> CoreResult<ContextValue> {
        let key = arg(self, args, 0)?.to_display_string();
        Ok(match value {
            ContextValue::Dict(map) => map.get(&key).cloned().unwrap_or_else(|| "".into()),
            _ => "".into(),
        })
    }
}

/// Attribute lookup on an object, `""` when missing.
pub struct AttrFilter;

impl Filter for AttrFilter {
    fn name(&self) -> &'static str {
        "attr"
    }

    fn arg_names(&self) -> &'static [&'static str] {
        &["name"]
    }

    fn apply(&self, value: &ContextValue, args: &[ContextValue]) -> CoreResult<ContextValue> {
        let name = arg(self, args, 0)?.to_display_string();
        if !value.is_truthy() {
            return Ok("".into());
        }
        Ok(value.resolve_path(&name).cloned().unwrap_or_else(|| "".into()))
    }
}

pub struct JsonDumpsFilter;

impl Filter for JsonDumpsFilter {
    fn name(&self) -> &'static str {
        "jsondumps"
    }

    fn apply(&self, value: &ContextValue, _args: &[ContextValue]) -> CoreResult<ContextValue> {
        serde_json::to_string(&value.to_json())
            .map(ContextValue::String)
            .map_err(|e| CoreError::SerializationError(e.to_string()))
    }
}

pub struct MakeIterableFilter;

impl Filter for MakeIterableFilter {
    fn name(&self) -> &'static str {
        "make_iterable"
    }

    fn apply(&self, value: &ContextValue, _args: &[ContextValue]) -> CoreResult<ContextValue> {
        Ok(match value {
            v if !v.is_truthy() => ContextValue::List(Vec::new()),
            ContextValue::List(_) => value.clone(),
            other => ContextValue::List(vec![other.clone()]),
        })
    }
}

// ── Math ───────────────────────────────────────────────────────────────

/// Longest string `multiply` may build.
const MAX_REPEAT_LEN: usize = 1 << 20;

#[derive(Clone, Copy)]
enum Op {
    Sub,
    Mul,
}

fn arithmetic(
    filter: &str,
    op: Op,
    value: &ContextValue,
    other: &ContextValue,
) -> CoreResult<ContextValue> {
    match (value, other) {
        (ContextValue::Integer(a), ContextValue::Integer(b)) => {
            let result = match op {
                Op::Sub => a.checked_sub(*b),
                Op::Mul => a.checked_mul(*b),
            };
            result
                .map(ContextValue::Integer)
                .ok_or_else(|| CoreError::TemplateError(format!("{filter}: integer overflow")))
        }
        (ContextValue::String(s) | ContextValue::SafeString(s), ContextValue::Integer(n))
            if matches!(op, Op::Mul) =>
        {
            let times = usize::try_from(*n).unwrap_or(0);
            match s.len().checked_mul(times) {
                Some(len) if len <= MAX_REPEAT_LEN => Ok(ContextValue::String(s.repeat(times))),
                _ => Err(CoreError::TemplateError(format!(
                    "{filter}: repeated string would exceed {MAX_REPEAT_LEN} bytes"
                ))),
            }
        }
        _ => match (value.as_float(), other.as_float()) {
            (Some(a), Some(b)) => Ok(ContextValue::Float(match op {
                Op::Sub => a - b,
                Op::Mul => a * b,
            })),
            _ => Err(type_error(filter, value, other)),
        },
    }
}

/// `{{ 5 | substract(by=2) }}` renders `3`.
pub struct SubstractFilter;

impl Filter for SubstractFilter {
    fn name(&self) -> &'static str {
        "substract"
    }

    fn arg_names(&self) -> &'static [&'static str] {
        &["by"]
    }

    fn apply(&self, value: &ContextValue, args: &[ContextValue]) -> CoreResult<ContextValue> {
        arithmetic(self.name(), Op::Sub, value, arg(self, args, 0)?)
    }
}

/// `{{ 5 | multiply(by=2) }}` renders `10`. Strings repeat.
pub struct MultiplyFilter;

impl Filter for MultiplyFilter {
    fn name(&self) -> &'static str {
        "multiply"
    }

    fn arg_names(&self) -> &'static [&'static str] {
        &["by"]
    }

    fn apply(&self, value: &ContextValue, args: &[ContextValue]) -> CoreResult<ContextValue> {
        arithmetic(self.name(), Op::Mul, value, arg(self, args, 0)?)
    }
}

/// True division: the result is always a float.
pub struct DivideFilter;

impl Filter for DivideFilter {
    fn name(&self) -> &'static str {
        "divide"
    }

    fn arg_names(&self) -> &'static [&'static str] {
        &["by"]
    }

    fn apply(&self, value: &ContextValue, args: &[ContextValue]) -> CoreResult<ContextValue> {
        let denominator = arg(self, args, 0)?;
        match (value.as_float(), denominator.as_float()) {
            (Some(_), Some(d)) if d == 0.0 => {
                Err(CoreError::TemplateError("divide: division by zero".into()))
            }
            (Some(n), Some(d)) => Ok(ContextValue::Float(n / d)),
            _ => Err(type_error(self.name(), value, denominator)),
        }
    }
}

pub struct AbsoluteFilter;

impl Filter for AbsoluteFilter {
    fn name(&self) -> &'static str {
        "absolute"
    }

    fn apply(&self, value: &ContextValue, _args: &[ContextValue]) -> CoreResult<ContextValue> {
        Ok(match value {
            ContextValue::Integer(i) => i
                .checked_abs()
                .map_or_else(|| value.clone(), ContextValue::Integer),
            ContextValue::Float(f) => ContextValue::Float(f.abs()),
            other => other.clone(),
        })
    }
}

// ── HTML ───────────────────────────────────────────────────────────────

/// Applies `linebreaks` only to text containing a newline.
pub struct LinebreaksSafeFilter;

impl Filter for LinebreaksSafeFilter {
    fn name(&self) -> &'static str {
        "linebreaks_safe"
    }

    fn arg_names(&self) -> &'static [&'static str] {
        &["autoescape"]
    }

    fn is_safe(&self) -> bool {
        true
    }

    fn apply(&self, value: &ContextValue, args: &[ContextValue]) -> CoreResult<ContextValue> {
        let autoescape = args.first().map_or(true, ContextValue::is_truthy);
        Ok(match value {
            ContextValue::String(s) | ContextValue::SafeString(s) if s.contains('\n') => {
                ContextValue::SafeString(linebreaks(s, autoescape))
            }
            other => other.clone(),
        })
    }
}

/// Which of an object's pages a link filter points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Absolute,
    Edit,
    Delete,
}

impl LinkKind {
    const fn key(self) -> &'static str {
        match self {
            Self::Absolute => "absolute_url",
            Self::Edit => "edit_url",
            Self::Delete => "delete_url",
        }
    }
}

/// Renders a link to an object's page.
///
/// Objects are dicts as built by
/// [`url_link_context`](crate::context::url_link_context). Without `text`
/// the object's own `*_url_link` is used when present, otherwise the url is
/// both the href and the text.
pub struct UrlLinkFilter {
    kind: LinkKind,
}

impl UrlLinkFilter {
    pub const fn new(kind: LinkKind) -> Self {
        Self { kind }
    }
}

impl Filter for UrlLinkFilter {
    fn name(&self) -> &'static str {
        match self.kind {
            LinkKind::Absolute => "get_absolute_url_link",
            LinkKind::Edit => "get_edit_url_link",
            LinkKind::Delete => "get_delete_url_link",
        }
    }

    fn arg_names(&self) -> &'static [&'static str] {
        &["text"]
    }

    fn is_safe(&self) -> bool {
        true
    }

    fn apply(&self, value: &ContextValue, args: &[ContextValue]) -> CoreResult<ContextValue> {
        let text = args
            .first()
            .filter(|t| t.is_truthy())
            .map(ContextValue::to_display_string);
        let key = self.kind.key();

        if text.is_none() {
            if let Some(link) = value.resolve_path(&format!("{key}_link")) {
                return Ok(ContextValue::SafeString(link.to_display_string()));
            }
        }

        let url = value
            .resolve_path(key)
            .map(ContextValue::to_display_string)
            .ok_or_else(|| {
                CoreError::TemplateError(format!("{}: object has no {key}", self.name()))
            })?;
        let text = text.unwrap_or_else(|| url.clone());
        Ok(ContextValue::SafeString(build_link::<&str, &str>(
            &url,
            &text,
            None,
            None,
            &[],
        )))
    }
}

/// Every built-in filter.
pub fn builtin_filters() -> Vec<Box<dyn Filter>> {
    vec![
        Box::new(GetItemFilter),
        Box::new(AttrFilter),
        Box::new(JsonDumpsFilter),
        Box::new(MakeIterableFilter),
        Box::new(SubstractFilter),
        Box::new(MultiplyFilter),
        Box::new(DivideFilter),
        Box::new(AbsoluteFilter),
        Box::new(LinebreaksSafeFilter),
        Box::new(UrlLinkFilter::new(LinkKind::Absolute)),
        Box::new(UrlLinkFilter::new(LinkKind::Edit)),
        Box::new(UrlLinkFilter::new(LinkKind::Delete)),
    ]
}
