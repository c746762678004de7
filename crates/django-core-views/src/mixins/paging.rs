//! Paging parameters read from the query string.

use django_core_common::settings::CoreSettings;
use django_core_http::HttpRequest;

use crate::view::Context;

/// Reads the page number `p` and page size `ps` from the query string.
///
/// Missing, unparsable or non-positive values fall back to the defaults.
///
/// ```
/// use django_core_http::HttpRequest;
/// use django_core_views::mixins::PagingViewMixin;
///
/// let request = HttpRequest::builder().query_string("p=3&ps=10").build();
/// let paging = PagingViewMixin::default().get_paging(&request);
/// assert_eq!((paging.page_num, paging.page_size, paging.page_offset), (3, 10, 20));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagingViewMixin {
    pub page_num: usize,
    pub page_size: usize,
    /// Query parameter carrying the page number.
    pub page_kwarg: String,
}

impl Default for PagingViewMixin {
    fn default() -> Self {
        Self {
            page_num: 1,
            page_size: 15,
            page_kwarg: "p".to_string(),
        }
    }
}

/// The paging in effect for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paging {
    pub page_num: usize,
    pub page_size: usize,
    /// Index of the first item on the page.
    pub page_offset: usize,
    pub page_kwarg: String,
}

impl PagingViewMixin {
    /// Defaults with the page size from settings.
    pub fn from_settings(settings: &CoreSettings) -> Self {
        Self {
            page_size: settings.default_page_size.max(1),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn get_paging(&self, request: &HttpRequest) -> Paging {
        let page_num = positive(request.get().get(&self.page_kwarg)).unwrap_or(self.page_num);
        let page_size = positive(request.get().get("ps")).unwrap_or(self.page_size);
        Paging {
            page_num,
            page_size,
            page_offset: (page_num - 1).saturating_mul(page_size),
            page_kwarg: self.page_kwarg.clone(),
        }
    }
}

fn positive(value: Option<&str>) -> Option<usize> {
    value
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|v| *v >= 1)
}

impl Paging {
    /// Adds `page_size`, `page_num`, `page_offset` and `page_kwarg`.
    pub fn add_to_context(&self, context: &mut Context) {
        context.insert("page_size".into(), self.page_size.into());
        context.insert("page_num".into(), self.page_num.into());
        context.insert("page_offset".into(), self.page_offset.into());
        context.insert("page_kwarg".into(), self.page_kwarg.clone().into());
    }

    /// The slice of `items` on this page.
    pub fn page<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.page_offset.min(items.len());
        let end = start.saturating_add(self.page_size).min(items.len());
        &items[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(qs: &str) -> HttpRequest {
        HttpRequest::builder().query_string(qs).build()
    }

    #[test]
    fn test_defaults() {
        let paging = PagingViewMixin::default().get_paging(&request(""));
        assert_eq!(paging.page_num, 1);
        assert_eq!(paging.page_size, 15);
        assert_eq!(paging.page_offset, 0);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let mixin = PagingViewMixin::default().page_size(20);
        let paging = mixin.get_paging(&request("p=0&ps=-4"));
        assert_eq!((paging.page_num, paging.page_size), (1, 20));
        let paging = mixin.get_paging(&request("p=abc&ps=5"));
        assert_eq!((paging.page_num, paging.page_size), (1, 5));
    }

    #[test]
    fn test_from_settings_and_context() {
        let settings = CoreSettings {
            default_page_size: 50,
            ..CoreSettings::default()
        };
        let paging = PagingViewMixin::from_settings(&settings).get_paging(&request("p=2"));
        assert_eq!(paging.page_offset, 50);

        let mut ctx = Context::new();
        paging.add_to_context(&mut ctx);
        assert_eq!(ctx["page_num"], 2);
        assert_eq!(ctx["page_size"], 50);
        assert_eq!(ctx["page_offset"], 50);
        assert_eq!(ctx["page_kwarg"], "p");
    }

    #[test]
    fn test_page_slice() {
        let items: Vec<i32> = (1..=7).collect();
        let paging = PagingViewMixin::default().page_size(3).get_paging(&request("p=3"));
        assert_eq!(paging.page(&items), &[7]);
        let paging = PagingViewMixin::default().page_size(3).get_paging(&request("p=9"));
        assert!(paging.page(&items).is_empty());
    }
}
