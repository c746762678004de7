//! String helpers: slugs, HTML escaping and paragraph formatting.

use regex::Regex;
use std::sync::OnceLock;

/// Converts a string to a URL-friendly slug.
///
/// Lowercases, drops anything that is not a word character, space or
/// hyphen, then collapses runs of whitespace and hyphens into one hyphen.
///
/// ```
/// use django_core_common::utils::text::slugify;
///
/// assert_eq!(slugify("Hello World!"), "hello-world");
/// assert_eq!(slugify("  My -- Slug  "), "my-slug");
/// ```
pub fn slugify(s: &str) -> String {
    static NON_ALNUM: OnceLock<Regex> = OnceLock::new();
    static MULTI_HYPHEN: OnceLock<Regex> = OnceLock::new();

    let non_alnum = NON_ALNUM.get_or_init(|| Regex::new(r"[^\w\s-]").unwrap());
    let multi_hyphen = MULTI_HYPHEN.get_or_init(|| Regex::new(r"[-\s]+").unwrap());

    let s = s.to_lowercase();
    let s = non_alnum.replace_all(&s, "");
    let s = multi_hyphen.replace_all(&s, "-");
    s.trim_matches('-').to_string()
}

/// Escapes `&`, `<`, `>`, `"` and `'` for inclusion in HTML.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wraps blank-line separated blocks in `<p>` and turns single newlines into `<br>`.
///
/// ```
/// use django_core_common::utils::text::linebreaks;
///
/// assert_eq!(linebreaks("a\nb\n\nc", true), "<p>a<br>b</p>\n\n<p>c</p>");
/// ```
pub fn linebreaks(value: &str, autoescape: bool) -> String {
    static PARAGRAPHS: OnceLock<Regex> = OnceLock::new();
    let splitter = PARAGRAPHS.get_or_init(|| Regex::new(r"\n{2,}").unwrap());

    let normalized = value.replace("\r\n", "\n").replace('\r', "\n");
    splitter
        .split(normalized.trim_matches('\n'))
        .map(|para| {
            let para = if autoescape {
                escape_html(para)
            } else {
                para.to_string()
            };
            format!("<p>{}</p>", para.replace('\n', "<br>"))
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_unicode_and_symbols() {
        assert_eq!(slugify("Rust & Django: 2024"), "rust-django-2024");
        assert_eq!(slugify("---"), "");
        assert_eq!(slugify("already-slugged"), "already-slugged");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_linebreaks_escape_toggle() {
        assert_eq!(linebreaks("<b>\n", true), "<p>&lt;b&gt;</p>");
        assert_eq!(linebreaks("<b>\r\nx", false), "<p><b><br>x</p>");
    }
}
