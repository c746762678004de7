//! URL helpers: redirect target checks and query string manipulation.

use std::collections::HashMap;

use url::form_urlencoded;
use url::Url;

use crate::error::{CoreError, CoreResult};

/// Returns `true` when `next_url` points back into this site.
///
/// Rejects empty values and protocol-relative `//host` URLs; accepts local
/// paths and absolute URLs under `site_root_uri`.
///
/// ```
/// use django_core_common::utils::urls::is_legit_next_url;
///
/// assert!(is_legit_next_url("/account/", "https://example.com"));
/// assert!(is_legit_next_url("https://example.com/x", "https://example.com"));
/// assert!(!is_legit_next_url("//evil.com", "https://example.com"));
/// assert!(!is_legit_next_url("https://evil.com", "https://example.com"));
/// ```
pub fn is_legit_next_url(next_url: &str, site_root_uri: &str) -> bool {
    if next_url.is_empty() || next_url.starts_with("//") {
        return false;
    }
    next_url.starts_with('/') || (!site_root_uri.is_empty() && next_url.starts_with(site_root_uri))
}

/// Appends url-encoded query parameters to `url`.
///
/// ```
/// use django_core_common::utils::urls::build_url;
///
/// assert_eq!(build_url("/search", &[("q", "a b"), ("p", "2")]), "/search?q=a+b&p=2");
/// assert_eq!(build_url("/search", &[] as &[(&str, &str)]), "/search");
/// ```
pub fn build_url<K, V>(url: &str, querystring_params: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    if querystring_params.is_empty() {
        return url.to_string();
    }
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in querystring_params {
        serializer.append_pair(key.as_ref(), value.as_ref());
    }
    format!("{url}?{}", serializer.finish())
}

fn parse_url(url: &str) -> CoreResult<Url> {
    Url::parse(url).map_err(|e| CoreError::BadRequest(format!("Invalid URL '{url}': {e}")))
}

/// Returns the first value of `key` in the URL's query string.
pub fn get_query_value_from_url(url: &str, key: &str) -> CoreResult<Option<String>> {
    let parsed = parse_url(url)?;
    Ok(parsed
        .query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned()))
}

/// Returns the value of each requested key; missing keys map to `None`.
pub fn get_query_values_from_url(
    url: &str,
    keys: &[&str],
) -> CoreResult<HashMap<String, Option<String>>> {
    let parsed = parse_url(url)?;
    let pairs: Vec<(String, String)> = parsed.query_pairs().into_owned().collect();
    Ok(keys
        .iter()
        .map(|key| {
            let value = pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone());
            ((*key).to_string(), value)
        })
        .collect())
}

/// Replaces (or appends) query string values, keeping the order of existing keys.
///
/// ```
/// use django_core_common::utils::urls::replace_url_query_values;
///
/// let url = replace_url_query_values(
///     "http://helloworld.com/some/path?test=5",
///     &[("test", "10")],
/// ).unwrap();
/// assert_eq!(url, "http://helloworld.com/some/path?test=10");
/// ```
pub fn replace_url_query_values<K, V>(url: &str, replace_vals: &[(K, V)]) -> CoreResult<String>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut parsed = parse_url(url)?;
    let mut pairs: Vec<(String, String)> = parsed.query_pairs().into_owned().collect();
    for (key, value) in replace_vals {
        let (key, value) = (key.as_ref(), value.as_ref());
        match pairs.iter_mut().find(|(k, _)| k == key) {
            Some(pair) => pair.1 = value.to_string(),
            None => pairs.push((key.to_string(), value.to_string())),
        }
    }
    parsed.query_pairs_mut().clear().extend_pairs(pairs.iter());
    Ok(parsed.to_string())
}
