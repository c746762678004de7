//! Logging integration.
//!
//! Installs a [`tracing`] subscriber configured from [`CoreSettings`] and
//! offers a per-request span helper used by the view layer.

use crate::settings::CoreSettings;

/// Installs the global tracing subscriber.
///
/// The filter comes from `settings.log_level` and falls back to `info` when
/// the directive does not parse. Debug mode gets a pretty, human readable
/// format; otherwise events are emitted as JSON. Installing twice is a no-op.
pub fn setup_logging(settings: &CoreSettings) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    if settings.debug {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init()
            .ok();
    } else {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .try_init()
            .ok();
    }
}

/// Creates a span for one request so nested events carry the method and path.
///
/// ```
/// use django_core_common::logging::request_span;
///
/// let span = request_span("GET", "/tokens/abc/");
/// let _guard = span.enter();
/// tracing::debug!("resolving token");
/// ```
pub fn request_span(method: &str, path: &str) -> tracing::Span {
    tracing::info_span!("request", method = method, path = path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_logging_twice_is_harmless() {
        let settings = CoreSettings {
            log_level: "not a [valid directive".to_string(),
            ..CoreSettings::default()
        };
        setup_logging(&settings);
        setup_logging(&CoreSettings::default());
    }
}
