//! Short query string keys mapped onto form field names.

use std::collections::HashMap;

use django_core_http::{HttpRequest, QueryDict};

/// Maps alias keys in GET query strings to form field names.
///
/// With the mapping `t -> title`, `?t=+hello+&foo=bar` gives the initial
/// data `{"title": "hello", "foo": "bar"}`. Keys without an alias pass
/// through; values are stripped. POST requests are never mapped.
///
/// ```
/// use django_core_http::HttpRequest;
/// use django_core_views::mixins::QueryStringAliasViewMixin;
///
/// let mixin = QueryStringAliasViewMixin::from_pairs(&[("t", "title")]);
/// let request = HttpRequest::builder().query_string("t=+hello+&foo=bar").build();
/// let mapped = mixin.map_query_string(&request);
/// assert_eq!(mapped["title"], "hello");
/// assert_eq!(mapped["foo"], "bar");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryStringAliasViewMixin {
    pub query_key_mapper: HashMap<String, String>,
}

impl QueryStringAliasViewMixin {
    pub const fn new(query_key_mapper: HashMap<String, String>) -> Self {
        Self { query_key_mapper }
    }

    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self::new(
            pairs
                .iter()
                .map(|(alias, name)| ((*alias).to_string(), (*name).to_string()))
                .collect(),
        )
    }

    /// The GET parameters with alias keys replaced; empty for POST requests
    /// or when there is no mapping.
    pub fn map_query_string(&self, request: &HttpRequest) -> HashMap<String, String> {
        if self.query_key_mapper.is_empty() || *request.method() == http::Method::POST {
            return HashMap::new();
        }
        request
            .get()
            .items()
            .map(|(key, value)| {
                let key = self
                    .query_key_mapper
                    .get(key)
                    .map_or(key, String::as_str);
                (key.to_string(), value.trim().to_string())
            })
            .collect()
    }

    /// `initial` updated with the mapped query string.
    pub fn get_initial(
        &self,
        request: &HttpRequest,
        mut initial: HashMap<String, String>,
    ) -> HashMap<String, String> {
        initial.extend(self.map_query_string(request));
        initial
    }

    /// The mapped query string as form data, falling back to the raw query
    /// string when nothing was mapped.
    pub fn to_query_dict(&self, request: &HttpRequest) -> QueryDict {
        let mapped = self.map_query_string(request);
        if mapped.is_empty() {
            return request.get().copy();
        }
        let pairs: Vec<(&str, &str)> = mapped
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        QueryDict::from_pairs(&pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_and_empty_mapping_are_not_mapped() {
        let mixin = QueryStringAliasViewMixin::from_pairs(&[("t", "title")]);
        let post = HttpRequest::builder()
            .method(http::Method::POST)
            .query_string("t=x")
            .build();
        assert!(mixin.map_query_string(&post).is_empty());

        let get = HttpRequest::builder().query_string("t=x").build();
        assert!(QueryStringAliasViewMixin::default()
            .map_query_string(&get)
            .is_empty());
    }

    #[test]
    fn test_get_initial_overrides() {
        let mixin = QueryStringAliasViewMixin::from_pairs(&[("t", "title")]);
        let request = HttpRequest::builder().query_string("t=new").build();
        let initial = HashMap::from([
            ("title".to_string(), "old".to_string()),
            ("kept".to_string(), "yes".to_string()),
        ]);
        let initial = mixin.get_initial(&request, initial);
        assert_eq!(initial["title"], "new");
        assert_eq!(initial["kept"], "yes");
    }

    #[test]
    fn test_to_query_dict() {
        let mixin = QueryStringAliasViewMixin::from_pairs(&[("t", "title")]);
        let request = HttpRequest::builder().query_string("t=a").build();
        let data = mixin.to_query_dict(&request);
        assert_eq!(data.get("title"), Some("a"));
        assert_eq!(data.get("t"), None);
    }
}
