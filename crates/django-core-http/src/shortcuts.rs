//! Redirect shortcuts.

use django_core_common::settings::CoreSettings;
use django_core_common::utils::urls::is_legit_next_url;

use crate::response::{HttpResponse, HttpResponseRedirect};

/// A 302 redirect to `url`.
pub fn redirect(url: &str) -> HttpResponse {
    HttpResponseRedirect::new(url)
}

/// Redirects to `next_url` if it points into this site, otherwise to
/// `default`, otherwise to `/`.
///
/// ```
/// use django_core_common::CoreSettings;
/// use django_core_http::safe_redirect;
///
/// let settings = CoreSettings::default();
/// let response = safe_redirect(Some("//evil.com"), Some("/home/"), &settings);
/// assert_eq!(response.header("location"), Some("/home/"));
/// ```
pub fn safe_redirect(
    next_url: Option<&str>,
    default: Option<&str>,
    settings: &CoreSettings,
) -> HttpResponse {
    match next_url {
        Some(next) if is_legit_next_url(next, &settings.site_root_uri) => redirect(next),
        Some(next) => {
            tracing::debug!(next, "refusing off-site redirect");
            redirect(default.filter(|d| !d.is_empty()).unwrap_or("/"))
        }
        None => redirect(default.filter(|d| !d.is_empty()).unwrap_or("/")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(response: &HttpResponse) -> &str {
        response.header("location").unwrap_or_default()
    }

    #[test]
    fn test_local_next_url() {
        let settings = CoreSettings::default();
        assert_eq!(location(&safe_redirect(Some("/a/"), None, &settings)), "/a/");
    }

    #[test]
    fn test_site_root_next_url() {
        let settings = CoreSettings {
            site_root_uri: "https://example.com".into(),
            ..CoreSettings::default()
        };
        let response = safe_redirect(Some("https://example.com/x"), None, &settings);
        assert_eq!(location(&response), "https://example.com/x");
        let response = safe_redirect(Some("https://evil.com/x"), None, &settings);
        assert_eq!(location(&response), "/");
    }

    #[test]
    fn test_fallbacks() {
        let settings = CoreSettings::default();
        assert_eq!(location(&safe_redirect(None, Some("/home/"), &settings)), "/home/");
        assert_eq!(location(&safe_redirect(Some(""), None, &settings)), "/");
        assert_eq!(location(&safe_redirect(Some("//evil.com"), Some(""), &settings)), "/");
    }
}
